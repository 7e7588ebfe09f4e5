use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::fractal2::LACUNARITY;

// Past this the top octave is finer than a f32 height grid can resolve.
pub const MAX_OCTAVES: u32 = 32;

// Everything the generator and classifier read, as one comparable value.
//
// Hosts keep the last applied snapshot and regenerate when the live value
// differs from it (see [`crate::Regenerator`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    // Terrain extent along x, in world units.
    pub width: u32,
    // Terrain extent along z, in world units.
    pub height: u32,
    // Vertical scale. Heights read back from a surface are normalized
    // height times this value, and the material thresholds are fractions
    // of it.
    pub amplitude: f32,
    // Noise frequency of the first octave.
    pub frequency: f64,
    // Number of noise octaves, 1 to `MAX_OCTAVES`.
    pub octaves: u32,
    // Amplitude falloff per octave. Values >= 1 do not decay.
    pub persistence: f64,
    // Multiplier applied to sampled heights before classification.
    pub texture_scale: f32,
    // Noise lattice seed.
    pub seed: u64,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            amplitude: 20.0,
            frequency: 20.0,
            octaves: 1,
            persistence: 0.5,
            texture_scale: 1.0,
            seed: 0,
        }
    }
}

impl GenerationParameters {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width as usize,
                height: self.height as usize,
            }
            .into());
        }
        if self.octaves < 1 {
            return Err(ConfigError::NoOctaves(self.octaves).into());
        }
        if self.octaves > MAX_OCTAVES {
            return Err(ConfigError::TooManyOctaves {
                octaves: self.octaves,
                max: MAX_OCTAVES,
            }
            .into());
        }
        if !(self.persistence.is_finite() && self.persistence > 0.0) {
            return Err(ConfigError::Persistence(self.persistence).into());
        }
        // the octave sum divides by the total weight, which must stay finite
        let total_weight: f64 = (0..self.octaves as i32)
            .map(|i| self.persistence.powi(i))
            .sum();
        if !total_weight.is_finite() {
            return Err(ConfigError::OctaveWeightOverflow {
                persistence: self.persistence,
                octaves: self.octaves,
            }
            .into());
        }
        finite("amplitude", self.amplitude as f64)?;
        finite("frequency", self.frequency)?;
        finite(
            "top octave frequency",
            self.frequency * LACUNARITY.powi(self.octaves as i32 - 1),
        )?;
        finite("texture_scale", self.texture_scale as f64)?;
        if self.amplitude < 0.0 {
            return Err(ConfigError::NegativeAmplitude(self.amplitude as f64).into());
        }
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value }.into())
    }
}
