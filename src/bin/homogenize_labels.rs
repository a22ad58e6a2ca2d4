use msi_fusion::image::io::{load_label_image, save_label_image};
use msi_fusion::segmentation::homogenize_labels;
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
    let mut args = env::args().skip(1);
    let (Some(image), Some(reference), Some(output)) = (args.next(), args.next(), args.next())
    else {
        return Err(usage());
    };

    let labels = load_label_image(Path::new(&image))?;
    let reference = load_label_image(Path::new(&reference))?;
    let out = homogenize_labels(&labels, &reference).map_err(|e| e.to_string())?;
    save_label_image(&out, Path::new(&output))?;
    println!(
        "Relabelled {image} ({} labels) against {} reference labels; saved to {output}",
        labels.max_label(),
        reference.max_label()
    );
    Ok(())
}

fn usage() -> String {
    "Usage: homogenize_labels <image.png> <reference.png> <out.png>".to_string()
}
