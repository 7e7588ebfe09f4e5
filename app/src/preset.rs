// JSON presets for generation parameters

use std::fs;
use std::path::Path;

use terrain_core::GenerationParameters;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preset rejected: {0}")]
    Invalid(#[from] terrain_core::TerrainError),
}

pub fn load(path: &Path) -> Result<GenerationParameters, PresetError> {
    let text = fs::read_to_string(path)?;
    let params: GenerationParameters = serde_json::from_str(&text)?;
    params.validate()?;
    log::info!("Loaded preset {}", path.display());
    Ok(params)
}

pub fn save(path: &Path, params: &GenerationParameters) -> Result<(), PresetError> {
    fs::write(path, serde_json::to_string_pretty(params)?)?;
    log::info!("Saved preset {}", path.display());
    Ok(())
}
