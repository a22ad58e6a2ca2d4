use msi_fusion::config::realignment::load_config;
use msi_fusion::cube::io::{load_spectra_json, save_cube_json};
use msi_fusion::cube::MsiCube;
use msi_fusion::image::io::write_json_file;
use msi_fusion::spectra::{realignment_quality, PeakAligner, RealignmentQuality};
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let file = load_spectra_json(&config.spectra)?;
    let aligned = PeakAligner::new(config.alignment)
        .align(&file.spectra)
        .map_err(|e| format!("Alignment failed: {e}"))?;
    let quality = realignment_quality(
        &file.spectra,
        &aligned,
        config.alignment.peaks,
        &config.quality,
    )
    .map_err(|e| format!("Quality evaluation failed: {e}"))?;

    let summary = RealignmentSummary {
        spectra: file.spectra.len(),
        detected_peaks: aligned.detected_peaks,
        aligned_mzs: aligned.mzs.clone(),
        quality,
    };
    write_json_file(&config.output.report_json, &summary)?;
    println!(
        "{} aligned m/z from {} peaks: precision={:.3} recall={:.3} missing={} intensity ratio={:.3}",
        summary.aligned_mzs.len(),
        summary.detected_peaks,
        summary.quality.precision,
        summary.quality.recall,
        summary.quality.missing.len(),
        summary.quality.intensity_ratio
    );
    println!("Saved report to {}", config.output.report_json.display());

    if let Some(path) = &config.output.cube_json {
        let cube = MsiCube::from_spectra(file.width, file.height, &aligned)
            .map_err(|e| format!("Failed to build datacube: {e}"))?;
        save_cube_json(&cube, path)?;
        println!("Saved aligned datacube to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: realignment_report <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RealignmentSummary {
    spectra: usize,
    detected_peaks: usize,
    aligned_mzs: Vec<f64>,
    quality: RealignmentQuality,
}
