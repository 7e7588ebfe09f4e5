// terrain_core holds the noise, heightfield and material-weight algorithms
pub mod error;
pub mod fractal2;
pub mod heightfield;
pub mod params;
pub mod perlin2;
pub mod preview;
pub mod randomize;
pub mod regen;
pub mod splat;
pub mod surface;
pub mod utils;

pub use error::{ConfigError, Result, TerrainError};
pub use fractal2::Fractal2D;
pub use heightfield::{HeightField, HeightfieldGenerator, generate};
pub use params::{GenerationParameters, MAX_OCTAVES};
pub use perlin2::Perlin2D;
pub use randomize::ParameterRandomizer;
pub use regen::{RegenerationReport, Regenerator};
pub use splat::{MaterialClassifier, MaterialLayer, RuleTable, Sampling, ThresholdRule, WeightField, classify};
pub use surface::{HeightSource, MemorySurface, TerrainSurface};
pub use utils::flatten2;

// coherent noise that can be sampled at any real 2D point
// implementations return values in [0, 1]
pub trait NoiseGenerator {
    fn get2(&self, x: f64, y: f64) -> f64;
}
