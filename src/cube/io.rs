//! Simple JSON interchange for datacubes and raw pixel spectra.
//!
//! Parsing vendor formats (imzML, TIFF stacks) is left to external loaders;
//! these files are what such loaders are expected to emit.
use super::annotation::{parse_annotations, AnnotationTable, MassListRow};
use super::{MsiCube, PeakStatistics};
use crate::image::io::{ensure_parent_dir, read_json_file, save_grayscale_f32, write_json_file};
use crate::spectra::PixelSpectrum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// On-disk datacube: intensities flattened pixel-major.
#[derive(Debug, Serialize, Deserialize)]
pub struct CubeFile {
    pub width: usize,
    pub height: usize,
    pub mzs: Vec<f64>,
    pub intensities: Vec<f32>,
}

/// On-disk list of pixel spectra on a `width × height` grid.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpectraFile {
    pub width: usize,
    pub height: usize,
    pub spectra: Vec<PixelSpectrum>,
}

pub fn load_cube_json(path: &Path) -> Result<MsiCube, String> {
    let file: CubeFile = read_json_file(path)?;
    MsiCube::new(file.width, file.height, file.mzs, file.intensities)
        .map_err(|e| format!("Invalid datacube {}: {e}", path.display()))
}

pub fn save_cube_json(cube: &MsiCube, path: &Path) -> Result<(), String> {
    let file = CubeFile {
        width: cube.width,
        height: cube.height,
        mzs: cube.mzs.clone(),
        intensities: cube.data.clone(),
    };
    write_json_file(path, &file)
}

/// Load pixel spectra. Mismatched m/z and intensity arrays are rejected while
/// parsing; pixels outside the declared grid are rejected here.
pub fn load_spectra_json(path: &Path) -> Result<SpectraFile, String> {
    let file: SpectraFile = read_json_file(path)?;
    if let Some(p) = file
        .spectra
        .iter()
        .find(|p| p.x >= file.width || p.y >= file.height)
    {
        return Err(format!(
            "Invalid spectra {}: pixel ({}, {}) outside {}x{} grid",
            path.display(),
            p.x,
            p.y,
            file.width,
            file.height
        ));
    }
    Ok(file)
}

/// Write ion image `k` as a min–max normalised grayscale PNG.
pub fn save_ion_image_png(cube: &MsiCube, k: usize, path: &Path) -> Result<(), String> {
    if k >= cube.n_mz() {
        return Err(format!(
            "Ion image index {k} out of range ({} m/z)",
            cube.n_mz()
        ));
    }
    save_grayscale_f32(&cube.ion_image(k).normalized(), path)
}

pub fn load_annotation_csv(path: &Path) -> Result<AnnotationTable, String> {
    let file = File::open(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_annotations(file).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

/// Write a mass list as CSV: m/z, mean intensity, then one column per
/// annotation column.
pub fn save_mass_list_csv(
    rows: &[MassListRow],
    columns: &[String],
    path: &Path,
) -> Result<(), String> {
    let write_err = |e: csv::Error| format!("Failed to write CSV {}: {e}", path.display());
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    let mut header = vec!["m/z".to_string(), "Average intensity".to_string()];
    header.extend(columns.iter().cloned());
    writer.write_record(&header).map_err(write_err)?;
    for row in rows {
        let mut record = vec![row.mz.to_string(), row.mean_intensity.to_string()];
        record.extend(row.annotations.iter().map(|a| a.clone().unwrap_or_default()));
        writer.write_record(&record).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to write CSV {}: {e}", path.display()))
}

pub fn save_statistics_csv(stats: &[PeakStatistics], path: &Path) -> Result<(), String> {
    let write_err = |e: csv::Error| format!("Failed to write CSV {}: {e}", path.display());
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    for row in stats {
        writer.serialize(row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to write CSV {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("msi_fusion_cube_io_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn cube_json_round_trip() {
        let cube = MsiCube::new(
            3,
            2,
            vec![100.0, 250.5],
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0],
        )
        .unwrap();
        let path = temp_path("cube.json");
        save_cube_json(&cube, &path).unwrap();
        let loaded = load_cube_json(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(loaded.mzs, cube.mzs);
        assert_eq!(loaded.data, cube.data);
    }

    #[test]
    fn cube_with_wrong_length_is_invalid() {
        let path = temp_path("short_cube.json");
        fs::write(&path, r#"{"width":2,"height":2,"mzs":[100.0],"intensities":[1.0,2.0]}"#)
            .unwrap();
        let err = load_cube_json(&path).unwrap_err();
        assert!(err.starts_with("Invalid datacube"), "{err}");
    }

    #[test]
    fn mass_list_and_statistics_csv_have_headers() {
        use crate::cube::annotation::mass_list;
        use crate::spectra::MzTolerance;

        let cube = MsiCube::new(2, 1, vec![100.0, 200.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let annotations = temp_path("annotations.csv");
        fs::write(&annotations, ";PC_Na\n200.0;PC_Na\n").unwrap();
        let table = load_annotation_csv(&annotations).unwrap();
        let rows = mass_list(&cube, Some(&table), MzTolerance::Da(0.01));

        let list = temp_path("mass_list.csv");
        save_mass_list_csv(&rows, &table.columns, &list).unwrap();
        let text = fs::read_to_string(&list).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["m/z,Average intensity,PC (Na)", "100,2,", "200,3,PC (Na)"]);

        let stats = temp_path("statistics.csv");
        save_statistics_csv(&cube.peak_statistics(), &stats).unwrap();
        let text = fs::read_to_string(&stats).unwrap();
        assert!(text.starts_with("mz,sampleVariability,sampleMean"), "{text}");
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn missing_annotation_file_is_reported() {
        let err = load_annotation_csv(&temp_path("no_such_annotations.csv")).unwrap_err();
        assert!(err.starts_with("Failed to read"), "{err}");
    }

    #[test]
    fn spectra_with_mismatched_arrays_fail_to_load() {
        let path = temp_path("mismatched_spectra.json");
        fs::write(
            &path,
            r#"{"width":1,"height":1,"spectra":[
                {"x":0,"y":0,"mz":[100.0,101.0,102.0],"intensities":[1.0,2.0,3.0,4.0,5.0]}
            ]}"#,
        )
        .unwrap();
        let err = load_spectra_json(&path).unwrap_err();
        assert!(err.contains("spectrum intensities"), "{err}");
    }

    #[test]
    fn spectra_outside_the_grid_are_invalid() {
        let path = temp_path("outside_spectra.json");
        fs::write(
            &path,
            r#"{"width":2,"height":1,"spectra":[
                {"x":0,"y":0,"mz":[100.0],"intensities":[1.0]},
                {"x":0,"y":1,"mz":[100.0],"intensities":[2.0]}
            ]}"#,
        )
        .unwrap();
        let err = load_spectra_json(&path).unwrap_err();
        assert!(err.starts_with("Invalid spectra"), "{err}");
        assert!(err.contains("(0, 1)"), "{err}");
    }
}
