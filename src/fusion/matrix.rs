use super::error::DecompositionError;
use crate::image::ImageF32;
use nalgebra::{DMatrix, RowDVector};
use serde::{Deserialize, Serialize};

/// Per-image intensity normalisation applied before decomposition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Normalization {
    None,
    /// Scale each image to `[0, 1]` over the masked pixels.
    #[default]
    MinMax,
    /// Scale each image to unit L2 norm over the masked pixels.
    UnitNorm,
}

impl Normalization {
    pub fn apply(self, row: &mut [f64]) {
        match self {
            Normalization::None => {}
            Normalization::MinMax => {
                let (lo, hi) = row
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                let range = hi - lo;
                if range > f64::EPSILON {
                    row.iter_mut().for_each(|v| *v = (*v - lo) / range);
                } else {
                    row.iter_mut().for_each(|v| *v = 0.0);
                }
            }
            Normalization::UnitNorm => {
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > f64::EPSILON {
                    row.iter_mut().for_each(|v| *v /= norm);
                }
            }
        }
    }
}

/// Masked, normalised pixel values of one image.
pub fn masked_row(
    image: &ImageF32,
    mask: &[bool],
    normalization: Normalization,
) -> Result<RowDVector<f64>, DecompositionError> {
    if mask.len() != image.len() {
        return Err(DecompositionError::ShapeMismatch {
            what: "mask",
            expected: image.len(),
            found: mask.len(),
        });
    }
    let mut values: Vec<f64> = image
        .data
        .iter()
        .zip(mask)
        .filter(|(_, &m)| m)
        .map(|(&v, _)| if v.is_finite() { v as f64 } else { 0.0 })
        .collect();
    if values.is_empty() {
        return Err(DecompositionError::EmptyMask);
    }
    normalization.apply(&mut values);
    Ok(RowDVector::from_vec(values))
}

/// Observation matrix with one row per image and one column per masked pixel.
pub fn data_matrix(
    images: &[ImageF32],
    mask: &[bool],
    normalization: Normalization,
) -> Result<DMatrix<f64>, DecompositionError> {
    if images.len() < 2 {
        return Err(DecompositionError::TooFewObservations {
            found: images.len(),
        });
    }
    let cols = mask.iter().filter(|&&m| m).count();
    if cols == 0 {
        return Err(DecompositionError::EmptyMask);
    }
    let mut matrix = DMatrix::zeros(images.len(), cols);
    for (i, image) in images.iter().enumerate() {
        let row = masked_row(image, mask, normalization)?;
        matrix.set_row(i, &row);
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_the_mask() {
        let a = ImageF32::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = ImageF32::from_vec(2, 2, vec![4.0, 0.0, 0.0, 3.0]).unwrap();
        let mask = [true, false, true, true];
        let m = data_matrix(&[a.clone(), b.clone()], &mask, Normalization::None).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 3.0, 4.0]);

        let unit = data_matrix(&[a, b], &mask, Normalization::UnitNorm).unwrap();
        assert!((unit.row(1).norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn min_max_maps_to_unit_interval() {
        let mut row = vec![2.0, 4.0, 3.0];
        Normalization::MinMax.apply(&mut row);
        assert_eq!(row, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let img = ImageF32::filled(2, 2, 1.0);
        assert_eq!(
            data_matrix(&[img.clone()], &[true; 4], Normalization::None).unwrap_err(),
            DecompositionError::TooFewObservations { found: 1 }
        );
        assert_eq!(
            data_matrix(&[img.clone(), img], &[false; 4], Normalization::None).unwrap_err(),
            DecompositionError::EmptyMask
        );
    }
}
