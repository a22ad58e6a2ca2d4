use crate::spectra::{AlignmentOptions, QualityOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
pub struct RealignmentToolConfig {
    /// Spectra file whose pixels share one m/z axis.
    pub spectra: PathBuf,
    #[serde(default)]
    pub alignment: AlignmentOptions,
    #[serde(default)]
    pub quality: QualityOptions,
    pub output: RealignmentOutputConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RealignmentOutputConfig {
    pub report_json: PathBuf,
    /// Aligned datacube (JSON), optional.
    pub cube_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<RealignmentToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
