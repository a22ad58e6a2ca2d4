use msi_fusion::config::{load_config, InputSource};
use msi_fusion::cube::io::{load_cube_json, load_spectra_json, save_ion_image_png};
use msi_fusion::image::io::{load_reference_image, save_grayscale_f32, write_json_file};
use msi_fusion::image::ImageF32;
use msi_fusion::FusionPipeline;
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

    let reference = load_reference_image(&config.input.reference)?;
    let pipeline = FusionPipeline::new(config.params.clone());
    let report = match config.input.source()? {
        InputSource::Cube(path) => {
            let cube = load_cube_json(path)?;
            pipeline.process_cube(&cube, &reference)
        }
        InputSource::Spectra(path) => {
            let file = load_spectra_json(path)?;
            pipeline.process_spectra(&file.spectra, file.width, file.height, &reference)
        }
    }
    .map_err(|e| format!("Fusion failed: {e}"))?;

    let output = &config.output;
    write_json_file(&output.report_json, &report)?;
    println!("{}", report.summary());
    println!("Saved report to {}", output.report_json.display());

    if let Some(path) = &output.registered_image {
        save_grayscale_f32(&report.registered_representative.normalized(), path)?;
        println!("Saved registered representative to {}", path.display());
    }
    if let Some(path) = &output.mask_image {
        let (w, h) = (report.input.reference_width, report.input.reference_height);
        let data = report
            .tissue_mask
            .iter()
            .map(|&m| if m { 1.0 } else { 0.0 })
            .collect();
        let mask = ImageF32::from_vec(w, h, data)
            .ok_or_else(|| "Tissue mask does not match the reference size".to_string())?;
        save_grayscale_f32(&mask, path)?;
        println!("Saved tissue mask to {}", path.display());
    }
    if let Some(dir) = &output.component_dir {
        for (j, component) in report.fusion.component_images.iter().enumerate() {
            let path = dir.join(format!("component_{j:02}.png"));
            save_grayscale_f32(&component.normalized(), &path)?;
        }
        println!(
            "Saved {} component images to {}",
            report.fusion.component_images.len(),
            dir.display()
        );
    }
    if let Some(path) = &output.reference_reconstruction {
        save_grayscale_f32(&report.fusion.reference_reconstruction.normalized(), path)?;
        println!("Saved reference reconstruction to {}", path.display());
    }
    if let Some(dir) = &output.ranked_ion_dir {
        for (rank, ion) in report.fusion.ranking.iter().enumerate() {
            let path = dir.join(format!("rank_{:02}_mz_{:.4}.png", rank + 1, ion.mz));
            save_ion_image_png(&report.warped_cube, ion.index, &path)?;
        }
        println!(
            "Saved {} ranked ion images to {}",
            report.fusion.ranking.len(),
            dir.display()
        );
    }

    Ok(())
}

fn usage() -> String {
    "Usage: msi_fusion <config.json>".to_string()
}
