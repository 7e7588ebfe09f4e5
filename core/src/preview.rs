use image::{GrayImage, Luma, Rgb, RgbImage};
use palette::LinSrgb;

use crate::heightfield::HeightField;
use crate::splat::{MaterialLayer, WeightField};

// Display colours for the standard material layers
pub fn layer_color(layer: MaterialLayer) -> LinSrgb {
    match layer {
        MaterialLayer::Grass => LinSrgb::new(0.1, 0.6, 0.2),
        MaterialLayer::Mountain => LinSrgb::new(0.5, 0.4, 0.3),
        MaterialLayer::Water => LinSrgb::new(0.0, 0.2, 0.7),
    }
}

pub fn standard_palette() -> Vec<LinSrgb> {
    MaterialLayer::ALL.iter().map(|&l| layer_color(l)).collect()
}

// Heights in [0, 1] as an 8-bit grayscale image, one pixel per cell
pub fn heights_to_image(field: &HeightField) -> GrayImage {
    let mut img = GrayImage::new(field.width() as u32, field.height() as u32);
    for (y, row) in field.rows().iter().enumerate() {
        for (x, &h) in row.iter().enumerate() {
            let gray = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
            img.put_pixel(x as u32, y as u32, Luma([gray]));
        }
    }
    img
}

// Blend each cell's layer colours by weight.
// Layers past the end of `palette` contribute nothing.
pub fn weights_to_image(weights: &WeightField, palette: &[LinSrgb]) -> RgbImage {
    let mut img = RgbImage::new(weights.width() as u32, weights.height() as u32);
    for y in 0..weights.height() {
        for x in 0..weights.width() {
            let (mut r, mut g, mut b) = (0.0f32, 0.0f32, 0.0f32);
            for (w, c) in weights.weights(y, x).iter().zip(palette) {
                r += c.red * w;
                g += c.green * w;
                b += c.blue * w;
            }
            let rgb = LinSrgb::new(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
                .into_format::<u8>();
            img.put_pixel(x as u32, y as u32, Rgb([rgb.red, rgb.green, rgb.blue]));
        }
    }
    img
}

// Interleaved RGB bytes, ready for an egui ColorImage
pub fn to_rgb_bytes(img: &RgbImage) -> Vec<u8> {
    img.as_raw().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_map_to_gray_levels() {
        let field = HeightField::from_rows(vec![vec![0.0, 1.0], vec![0.5, 0.25]]).unwrap();
        let img = heights_to_image(&field);
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 0).0, [255]);
        assert_eq!(img.get_pixel(0, 1).0, [128]);
    }

    #[test]
    fn pure_layers_take_their_colour() {
        let weights = WeightField::from_raw(
            3,
            1,
            3,
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        let palette = standard_palette();
        let img = weights_to_image(&weights, &palette);
        for (x, layer) in MaterialLayer::ALL.iter().enumerate() {
            let c = layer_color(*layer).into_format::<u8>();
            assert_eq!(img.get_pixel(x as u32, 0).0, [c.red, c.green, c.blue]);
        }
    }

    #[test]
    fn rgb_bytes_are_interleaved() {
        let weights = WeightField::from_raw(2, 1, 3, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]).unwrap();
        let bytes = to_rgb_bytes(&weights_to_image(&weights, &standard_palette()));
        assert_eq!(bytes.len(), 2 * 3);
        assert_eq!(bytes[0..3], bytes[3..6]);
    }
}
