// Generates and saves three 257×257 images:
// Single-octave heightfield
// Four-octave heightfield
// Material map of the four-octave terrain

use std::path::Path;

use terrain_core::preview::{heights_to_image, standard_palette, weights_to_image};
use terrain_core::{GenerationParameters, classify, generate};

fn main() {
    let size = 257;
    let single = GenerationParameters {
        frequency: 4.0,
        seed: 42,
        ..Default::default()
    };
    let fractal = GenerationParameters {
        octaves: 4,
        persistence: 0.5,
        ..single
    };

    // 1) Raw Perlin
    let raw = generate(&single, size, size).unwrap();
    heights_to_image(&raw).save(Path::new("heights_1_octave.png")).unwrap();
    println!("Saved heights_1_octave.png");

    // 2) Fractal Perlin
    let heights = generate(&fractal, size, size).unwrap();
    heights_to_image(&heights).save(Path::new("heights_4_octaves.png")).unwrap();
    println!("Saved heights_4_octaves.png");

    // 3) Material map at half resolution
    let weights = classify(&heights.scaled(fractal.amplitude), &fractal, size / 2, size / 2, 3).unwrap();
    weights_to_image(&weights, &standard_palette())
        .save(Path::new("splat_4_octaves.png"))
        .unwrap();
    println!("Saved splat_4_octaves.png");
}
