use crate::spectra::MzTolerance;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
pub struct StatisticsToolConfig {
    /// Datacube (JSON) laid out as samples (rows) × replicates (columns).
    pub cube: PathBuf,
    /// Semicolon-separated species annotations, optional.
    pub annotation_csv: Option<PathBuf>,
    /// Window used to match cube m/z values with annotated masses.
    #[serde(default)]
    pub tolerance: MzTolerance,
    pub output: StatisticsOutputConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatisticsOutputConfig {
    pub report_json: PathBuf,
    pub mass_list_csv: Option<PathBuf>,
    /// Mass list restricted to annotated m/z values.
    pub curated_csv: Option<PathBuf>,
    pub statistics_csv: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<StatisticsToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_defaults_when_omitted() {
        let path = std::env::temp_dir().join(format!(
            "msi_fusion_statistics_config_{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{ "cube": "cube.json", "output": { "report_json": "out/stats.json" } }"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.tolerance, MzTolerance::default());
        assert!(config.annotation_csv.is_none());
        assert!(config.output.statistics_csv.is_none());
    }
}
