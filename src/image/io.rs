//! I/O helpers for grayscale images, label maps and JSON.
//!
//! - `load_reference_image`: read a PNG/TIFF (8 or 16 bit) into `ImageF32` in `[0, 1]`.
//! - `save_grayscale_f32`: write an `ImageF32` to a grayscale PNG.
//! - `save_label_image` / `load_label_image`: label maps as 8-bit PNGs.
//! - `write_json_file` / `read_json_file`: serde round trips through disk.
use super::{ImageF32, ImageView, LabelImage};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a reference modality image keeping 16-bit precision when present.
pub fn load_reference_image(path: &Path) -> Result<ImageF32, String> {
    let img = open_image(path)?.into_luma16();
    let (w, h) = (img.width() as usize, img.height() as usize);
    let data = img
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / u16::MAX as f32)
        .collect();
    ImageF32::from_vec(w, h, data)
        .ok_or_else(|| format!("Decoded buffer size mismatch for {}", path.display()))
}

fn open_image(path: &Path) -> Result<DynamicImage, String> {
    image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))
}

/// Save a float image to a grayscale PNG, clamping values in [0, 255].
///
/// Values are expected in `[0, 1]`; callers holding raw intensities should
/// pass `image.normalized()`.
pub fn save_grayscale_f32(image: &ImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for y in 0..image.h {
        let row = image.row(y);
        for (x, &px) in row.iter().enumerate() {
            let v = (px * 255.0).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save a label map as an 8-bit PNG. Labels above 255 are rejected.
pub fn save_label_image(labels: &LabelImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let data = labels
        .data
        .iter()
        .map(|&l| u8::try_from(l).map_err(|_| format!("Label {l} does not fit in 8 bits")))
        .collect::<Result<Vec<u8>, String>>()?;
    let image: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_raw(labels.w as u32, labels.h as u32, data)
            .ok_or_else(|| "Failed to create image buffer".to_string())?;
    DynamicImage::ImageLuma8(image)
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Load an 8/16-bit grayscale image whose pixel values are labels.
pub fn load_label_image(path: &Path) -> Result<LabelImage, String> {
    let dynamic = open_image(path)?;
    let (w, h) = (dynamic.width() as usize, dynamic.height() as usize);
    // Converting 8-bit data to 16 bits would rescale the labels.
    let data: Vec<u32> = match dynamic {
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => dynamic
            .into_luma16()
            .into_raw()
            .into_iter()
            .map(u32::from)
            .collect(),
        _ => dynamic
            .into_luma8()
            .into_raw()
            .into_iter()
            .map(u32::from)
            .collect(),
    };
    LabelImage::from_vec(w, h, data)
        .ok_or_else(|| format!("Decoded buffer size mismatch for {}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

/// Read and deserialize a JSON document.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&data).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
