use crate::pipeline::FusionParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Input files of a fusion run. Exactly one of `cube` / `spectra` is set.
#[derive(Clone, Debug, Deserialize)]
pub struct InputConfig {
    pub cube: Option<PathBuf>,
    pub spectra: Option<PathBuf>,
    pub reference: PathBuf,
}

/// Where the datacube comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource<'a> {
    Cube(&'a Path),
    Spectra(&'a Path),
}

impl InputConfig {
    pub fn source(&self) -> Result<InputSource<'_>, String> {
        match (&self.cube, &self.spectra) {
            (Some(cube), None) => Ok(InputSource::Cube(cube)),
            (None, Some(spectra)) => Ok(InputSource::Spectra(spectra)),
            (Some(_), Some(_)) => Err("Config sets both input.cube and input.spectra".to_string()),
            (None, None) => Err("Config sets neither input.cube nor input.spectra".to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    pub report_json: PathBuf,
    /// Registered representative image (PNG).
    pub registered_image: Option<PathBuf>,
    /// Warped tissue mask (PNG).
    pub mask_image: Option<PathBuf>,
    /// Directory receiving one PNG per component image.
    pub component_dir: Option<PathBuf>,
    /// Reference reconstructed from the components (PNG).
    pub reference_reconstruction: Option<PathBuf>,
    /// Directory receiving the registered ion images of the ranking.
    pub ranked_ion_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FusionToolConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub params: FusionParams,
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<FusionToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: FusionToolConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    config.input.source()?;
    Ok(config)
}
