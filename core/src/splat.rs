// Height-banded material weights ("splat" maps).
//
// Every alpha cell starts from a baseline weight vector and walks an
// ordered ladder of height thresholds. Each rule whose threshold the cell
// clears overwrites the layers it names, so the highest band reached
// decides the final blend. The vector is then normalized to sum to 1.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, TerrainError};
use crate::params::GenerationParameters;
use crate::surface::HeightSource;
use crate::utils::{nearest_index, unit_coord};

// Material layers of the standard rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialLayer {
    Grass = 0,
    Mountain = 1,
    Water = 2,
}

impl MaterialLayer {
    pub const ALL: [MaterialLayer; 3] = [
        MaterialLayer::Grass,
        MaterialLayer::Mountain,
        MaterialLayer::Water,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialLayer::Grass => "grass",
            MaterialLayer::Mountain => "mountain",
            MaterialLayer::Water => "water",
        }
    }
}

// Overwrites `assign` layers once the sampled height exceeds
// `fraction * amplitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub fraction: f64,
    pub assign: Vec<(usize, f32)>,
}

impl ThresholdRule {
    pub fn new(fraction: f64, assign: &[(MaterialLayer, f32)]) -> Self {
        Self {
            fraction,
            assign: assign.iter().map(|&(l, w)| (l.index(), w)).collect(),
        }
    }
}

// Baseline weights plus the threshold ladder, applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub baseline: Vec<f32>,
    pub rules: Vec<ThresholdRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleTable {
    // Water everywhere, grass once above the waterline, mountain towards
    // the top of the vertical range.
    pub fn standard() -> Self {
        use MaterialLayer::*;

        Self {
            baseline: vec![0.0, 0.0, 0.5],
            rules: vec![
                // above water, grass starts
                ThresholdRule::new(0.15, &[(Water, 0.25), (Grass, 0.25)]),
                // fully above water
                ThresholdRule::new(0.25, &[(Water, 0.0), (Grass, 0.5)]),
                // foothills
                ThresholdRule::new(0.6, &[(Water, 0.0), (Grass, 0.25), (Mountain, 0.5)]),
                // mountains only
                ThresholdRule::new(0.7, &[(Water, 0.0), (Grass, 0.0), (Mountain, 0.5)]),
            ],
        }
    }

    // Smallest layer count that holds every layer the table writes.
    pub fn required_layers(&self) -> usize {
        self.rules
            .iter()
            .flat_map(|r| r.assign.iter().map(|&(layer, _)| layer + 1))
            .fold(self.baseline.len(), usize::max)
    }

    // Unnormalized weights for a (texture-scaled) height. `out` is cleared
    // first and must hold at least `required_layers()` entries.
    pub fn apply(&self, height: f32, amplitude: f32, out: &mut [f32]) {
        out.fill(0.0);
        out[..self.baseline.len()].copy_from_slice(&self.baseline);
        let height = height as f64;
        let amplitude = amplitude as f64;
        for rule in &self.rules {
            if height > amplitude * rule.fraction {
                for &(layer, weight) in &rule.assign {
                    out[layer] = weight;
                }
            }
        }
    }
}

// How an alpha cell reads the height grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sampling {
    #[default]
    Nearest,
    Bilinear,
}

// Per-cell normalized material weights, `layers` values per cell,
// row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightField {
    width: usize,
    height: usize,
    layers: usize,
    data: Vec<f32>,
}

impl WeightField {
    pub fn from_raw(width: usize, height: usize, layers: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || layers == 0 {
            return Err(ConfigError::EmptyGrid { width, height }.into());
        }
        let expected = width * height * layers;
        if data.len() != expected {
            return Err(ConfigError::DataLength {
                expected,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            layers,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn weights(&self, row: usize, col: usize) -> &[f32] {
        let start = (row * self.width + col) * self.layers;
        &self.data[start..start + self.layers]
    }

    pub fn get(&self, row: usize, col: usize, layer: usize) -> f32 {
        self.weights(row, col)[layer]
    }

    // Index of the heaviest layer at a cell; the lowest index wins ties.
    pub fn dominant(&self, row: usize, col: usize) -> usize {
        self.weights(row, col)
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &w)| if w > best.1 { (i, w) } else { best })
            .0
    }
}

// Turns heights into normalized material weights.
#[derive(Debug, Clone, Default)]
pub struct MaterialClassifier {
    rules: RuleTable,
    sampling: Sampling,
}

impl MaterialClassifier {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            sampling: Sampling::Nearest,
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    // Normalized weights for one height, written into `out`.
    // Returns the raw sum as the error when it is zero or not finite.
    pub fn weights_for_height(
        &self,
        height: f32,
        params: &GenerationParameters,
        out: &mut [f32],
    ) -> std::result::Result<(), f32> {
        self.rules
            .apply(height * params.texture_scale, params.amplitude, out);
        let sum: f32 = out.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(sum);
        }
        for w in out.iter_mut() {
            *w /= sum;
        }
        Ok(())
    }

    fn sample<S: HeightSource + ?Sized>(&self, source: &S, u: f64, v: f64) -> f32 {
        let w = source.heightmap_width();
        let h = source.heightmap_height();
        match self.sampling {
            Sampling::Nearest => source.get_height(nearest_index(v, h), nearest_index(u, w)),
            Sampling::Bilinear => {
                let fx = (u * w as f64).min((w - 1) as f64);
                let fy = (v * h as f64).min((h - 1) as f64);
                let (x0, y0) = (fx.floor() as usize, fy.floor() as usize);
                let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
                let tx = (fx - x0 as f64) as f32;
                let ty = (fy - y0 as f64) as f32;

                let a = source.get_height(y0, x0);
                let b = source.get_height(y0, x1);
                let c = source.get_height(y1, x0);
                let d = source.get_height(y1, x1);

                let ab = a * (1.0 - tx) + b * tx;
                let cd = c * (1.0 - tx) + d * tx;
                ab * (1.0 - ty) + cd * ty
            }
        }
    }

    // Classify every cell of an `alpha_width` x `alpha_height` grid with
    // `layers` layers per cell, reading heights from `source`.
    pub fn classify<S: HeightSource + Sync + ?Sized>(
        &self,
        source: &S,
        params: &GenerationParameters,
        alpha_width: usize,
        alpha_height: usize,
        layers: usize,
    ) -> Result<WeightField> {
        params.validate()?;
        if alpha_width == 0 || alpha_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: alpha_width,
                height: alpha_height,
            }
            .into());
        }
        let (hm_width, hm_height) = (source.heightmap_width(), source.heightmap_height());
        if hm_width == 0 || hm_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: hm_width,
                height: hm_height,
            }
            .into());
        }
        // an empty table still needs one layer to hold a cell
        let required = self.rules.required_layers().max(1);
        if layers < required {
            return Err(ConfigError::NotEnoughLayers {
                required,
                available: layers,
            }
            .into());
        }

        let start = Instant::now();
        let mut data = vec![0.0f32; alpha_width * alpha_height * layers];
        // each worker owns one alpha row
        data.par_chunks_mut(alpha_width * layers)
            .enumerate()
            .try_for_each(|(row, cells)| -> Result<()> {
                let v = unit_coord(row, alpha_height);
                for (col, out) in cells.chunks_mut(layers).enumerate() {
                    let h = self.sample(source, unit_coord(col, alpha_width), v);
                    self.weights_for_height(h, params, out)
                        .map_err(|sum| TerrainError::Normalization { row, col, sum })?;
                }
                Ok(())
            })?;

        log::debug!(
            "Classified {}x{}x{} material map from {}x{} heights in {:.2} ms",
            alpha_width,
            alpha_height,
            layers,
            hm_width,
            hm_height,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(WeightField {
            width: alpha_width,
            height: alpha_height,
            layers,
            data,
        })
    }
}

// One-shot classification with the standard rule table and
// nearest-neighbour sampling.
pub fn classify<S: HeightSource + Sync + ?Sized>(
    source: &S,
    params: &GenerationParameters,
    alpha_width: usize,
    alpha_height: usize,
    layers: usize,
) -> Result<WeightField> {
    MaterialClassifier::default().classify(source, params, alpha_width, alpha_height, layers)
}
