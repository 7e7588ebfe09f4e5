// The host-side terrain container the pipeline writes into.

use crate::error::{ConfigError, Result};
use crate::heightfield::HeightField;
use crate::splat::WeightField;

// Read access to world-space heights on a grid.
pub trait HeightSource {
    fn heightmap_width(&self) -> usize;
    fn heightmap_height(&self) -> usize;
    // Height at a heightmap cell, in world units (normalized height times
    // the surface's vertical size).
    fn get_height(&self, row: usize, col: usize) -> f32;
}

// A terrain container owned by the host: heightmap, material map and
// world size.
pub trait TerrainSurface: HeightSource {
    fn alphamap_width(&self) -> usize;
    fn alphamap_height(&self) -> usize;
    fn alphamap_layers(&self) -> usize;

    // World size as `[width, vertical, height]`.
    fn set_size(&mut self, size: [f32; 3]);

    fn set_heights(&mut self, origin_x: usize, origin_y: usize, heights: HeightField) -> Result<()>;

    fn set_alphamaps(&mut self, origin_x: usize, origin_y: usize, weights: WeightField)
    -> Result<()>;
}

// In-memory surface with fixed heightmap and alphamap resolutions.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    size: [f32; 3],
    heightmap_width: usize,
    heightmap_height: usize,
    heights: Vec<f32>,
    alphamap_width: usize,
    alphamap_height: usize,
    alphamap_layers: usize,
    alphamaps: Vec<f32>,
}

impl MemorySurface {
    pub fn new(
        heightmap_resolution: (usize, usize),
        alphamap_resolution: (usize, usize),
        alphamap_layers: usize,
    ) -> Self {
        let (heightmap_width, heightmap_height) = heightmap_resolution;
        let (alphamap_width, alphamap_height) = alphamap_resolution;
        Self {
            size: [1.0, 1.0, 1.0],
            heightmap_width,
            heightmap_height,
            heights: vec![0.0; heightmap_width * heightmap_height],
            alphamap_width,
            alphamap_height,
            alphamap_layers,
            alphamaps: vec![0.0; alphamap_width * alphamap_height * alphamap_layers],
        }
    }

    pub fn size(&self) -> [f32; 3] {
        self.size
    }

    // Normalized heights, row-major.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    // Snapshot of the installed heightmap.
    pub fn height_field(&self) -> Result<HeightField> {
        HeightField::from_rows(
            self.heights
                .chunks(self.heightmap_width.max(1))
                .map(<[f32]>::to_vec)
                .collect(),
        )
    }

    // Snapshot of the installed material map.
    pub fn weight_field(&self) -> Result<WeightField> {
        WeightField::from_raw(
            self.alphamap_width,
            self.alphamap_height,
            self.alphamap_layers,
            self.alphamaps.clone(),
        )
    }

    pub fn alphamap(&self, row: usize, col: usize) -> &[f32] {
        let start = (row * self.alphamap_width + col) * self.alphamap_layers;
        &self.alphamaps[start..start + self.alphamap_layers]
    }
}

fn check_region(
    origin: (usize, usize),
    extent: (usize, usize),
    grid: (usize, usize),
) -> Result<()> {
    if origin.0 + extent.0 > grid.0 || origin.1 + extent.1 > grid.1 {
        return Err(ConfigError::RegionOutOfBounds {
            origin_x: origin.0,
            origin_y: origin.1,
            width: extent.0,
            height: extent.1,
            grid_width: grid.0,
            grid_height: grid.1,
        }
        .into());
    }
    Ok(())
}

impl HeightSource for MemorySurface {
    fn heightmap_width(&self) -> usize {
        self.heightmap_width
    }

    fn heightmap_height(&self) -> usize {
        self.heightmap_height
    }

    fn get_height(&self, row: usize, col: usize) -> f32 {
        self.heights[row * self.heightmap_width + col] * self.size[1]
    }
}

impl TerrainSurface for MemorySurface {
    fn alphamap_width(&self) -> usize {
        self.alphamap_width
    }

    fn alphamap_height(&self) -> usize {
        self.alphamap_height
    }

    fn alphamap_layers(&self) -> usize {
        self.alphamap_layers
    }

    fn set_size(&mut self, size: [f32; 3]) {
        self.size = size;
    }

    fn set_heights(&mut self, origin_x: usize, origin_y: usize, heights: HeightField) -> Result<()> {
        check_region(
            (origin_x, origin_y),
            (heights.width(), heights.height()),
            (self.heightmap_width, self.heightmap_height),
        )?;
        for (y, row) in heights.rows().iter().enumerate() {
            let start = (origin_y + y) * self.heightmap_width + origin_x;
            self.heights[start..start + row.len()].copy_from_slice(row);
        }
        Ok(())
    }

    fn set_alphamaps(
        &mut self,
        origin_x: usize,
        origin_y: usize,
        weights: WeightField,
    ) -> Result<()> {
        check_region(
            (origin_x, origin_y),
            (weights.width(), weights.height()),
            (self.alphamap_width, self.alphamap_height),
        )?;
        if weights.layers() != self.alphamap_layers {
            return Err(ConfigError::NotEnoughLayers {
                required: weights.layers(),
                available: self.alphamap_layers,
            }
            .into());
        }
        let stride = weights.width() * self.alphamap_layers;
        for y in 0..weights.height() {
            let start = ((origin_y + y) * self.alphamap_width + origin_x) * self.alphamap_layers;
            self.alphamaps[start..start + stride]
                .copy_from_slice(&weights.as_slice()[y * stride..(y + 1) * stride]);
        }
        Ok(())
    }
}
