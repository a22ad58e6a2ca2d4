use super::error::DecompositionError;
use crate::image::ImageF32;
use nalgebra::{DMatrix, DVector};

/// Image `weightsᵀ · components` scattered back onto the masked pixels of a
/// `width × height` grid. Unmasked pixels are 0.
pub fn reconstruct_image(
    components: &DMatrix<f64>,
    weights: &DVector<f64>,
    mask: &[bool],
    width: usize,
    height: usize,
) -> Result<ImageF32, DecompositionError> {
    if weights.len() != components.nrows() {
        return Err(DecompositionError::ShapeMismatch {
            what: "component weights",
            expected: components.nrows(),
            found: weights.len(),
        });
    }
    let values = weights.transpose() * components;
    scatter(values.iter().copied(), values.len(), mask, width, height)
}

/// Row `index` of `components` as an image.
pub fn component_image(
    components: &DMatrix<f64>,
    index: usize,
    mask: &[bool],
    width: usize,
    height: usize,
) -> Result<ImageF32, DecompositionError> {
    let row = components.row(index);
    scatter(row.iter().copied(), row.len(), mask, width, height)
}

fn scatter(
    values: impl Iterator<Item = f64>,
    count: usize,
    mask: &[bool],
    width: usize,
    height: usize,
) -> Result<ImageF32, DecompositionError> {
    if mask.len() != width * height {
        return Err(DecompositionError::ShapeMismatch {
            what: "mask",
            expected: width * height,
            found: mask.len(),
        });
    }
    let selected = mask.iter().filter(|&&m| m).count();
    if selected != count {
        return Err(DecompositionError::ShapeMismatch {
            what: "masked pixels",
            expected: count,
            found: selected,
        });
    }
    let mut image = ImageF32::new(width, height);
    let targets = mask.iter().enumerate().filter(|(_, &m)| m).map(|(i, _)| i);
    for (idx, v) in targets.zip(values) {
        image.data[idx] = v as f32;
    }
    Ok(image)
}
