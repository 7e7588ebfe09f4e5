// Error types for terrain generation

use thiserror::Error;

// Invalid parameters or geometry, detected before any grid work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("octaves must be at least 1, got {0}")]
    NoOctaves(u32),

    #[error("at most {max} octaves are supported, got {octaves}")]
    TooManyOctaves { octaves: u32, max: u32 },

    #[error("persistence must be positive and finite, got {0}")]
    Persistence(f64),

    #[error("persistence {persistence} overflows the weight of {octaves} octaves")]
    OctaveWeightOverflow { persistence: f64, octaves: u32 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("amplitude must not be negative, got {0}")]
    NegativeAmplitude(f64),

    #[error("material map needs {required} layers, surface has {available}")]
    NotEnoughLayers { required: usize, available: usize },

    #[error("region {width}x{height} at ({origin_x}, {origin_y}) exceeds {grid_width}x{grid_height} grid")]
    RegionOutOfBounds {
        origin_x: usize,
        origin_y: usize,
        width: usize,
        height: usize,
        grid_width: usize,
        grid_height: usize,
    },

    #[error("weight buffer holds {actual} values, grid needs {expected}")]
    DataLength { expected: usize, actual: usize },

    #[error("invalid randomization range: {0}")]
    Randomizer(String),
}

// Main error type for terrain generation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("material weights at row {row}, col {col} sum to {sum}")]
    Normalization { row: usize, col: usize, sum: f32 },
}

impl TerrainError {
    pub fn is_config(&self) -> bool {
        matches!(self, TerrainError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, TerrainError>;
