use msi_fusion::config::statistics::load_config;
use msi_fusion::cube::annotation::{curated, mass_list, MassListRow};
use msi_fusion::cube::io::{
    load_annotation_csv, load_cube_json, save_mass_list_csv, save_statistics_csv,
};
use msi_fusion::cube::PeakStatistics;
use msi_fusion::image::io::write_json_file;
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

    let cube = load_cube_json(&config.cube)?;
    let table = config
        .annotation_csv
        .as_deref()
        .map(load_annotation_csv)
        .transpose()?;
    let columns = table.as_ref().map(|t| t.columns.clone()).unwrap_or_default();
    let rows = mass_list(&cube, table.as_ref(), config.tolerance);
    let curated_rows = curated(&rows);
    let statistics = cube.peak_statistics();

    let summary = StatisticsSummary {
        samples: cube.height(),
        replicates: cube.width(),
        columns: columns.clone(),
        mass_list: rows,
        curated: curated_rows,
        statistics,
    };
    write_json_file(&config.output.report_json, &summary)?;
    println!(
        "{} m/z over {} samples × {} replicates, {} annotated",
        summary.mass_list.len(),
        summary.samples,
        summary.replicates,
        summary.curated.len()
    );
    println!("Saved report to {}", config.output.report_json.display());

    if let Some(path) = &config.output.mass_list_csv {
        save_mass_list_csv(&summary.mass_list, &columns, path)?;
        println!("Saved mass list to {}", path.display());
    }
    if let Some(path) = &config.output.curated_csv {
        save_mass_list_csv(&summary.curated, &columns, path)?;
        println!("Saved curated mass list to {}", path.display());
    }
    if let Some(path) = &config.output.statistics_csv {
        save_statistics_csv(&summary.statistics, path)?;
        println!("Saved statistics to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: peak_statistics <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsSummary {
    samples: usize,
    replicates: usize,
    columns: Vec<String>,
    mass_list: Vec<MassListRow>,
    curated: Vec<MassListRow>,
    statistics: Vec<PeakStatistics>,
}
