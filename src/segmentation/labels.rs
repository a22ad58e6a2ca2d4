//! Transfer of label identities from a reference labelling.

use crate::error::FusionError;
use crate::image::LabelImage;

/// Relabel `image_labels` so its clusters carry the labels of the spatially
/// matching clusters in `reference`.
///
/// For every reference label `L` (including background 0), the lower median
/// of the image labels found inside `L` is taken as the matching cluster, so
/// the match is always a label that occurs in the image. Every pixel of that
/// cluster then receives `L`. Later reference labels win when
/// two of them match the same cluster; unmatched pixels become 0.
pub fn homogenize_labels(
    image_labels: &LabelImage,
    reference: &LabelImage,
) -> Result<LabelImage, FusionError> {
    if reference.w != image_labels.w {
        return Err(FusionError::ShapeMismatch {
            what: "reference label map width",
            expected: image_labels.w,
            found: reference.w,
        });
    }
    if reference.h != image_labels.h {
        return Err(FusionError::ShapeMismatch {
            what: "reference label map height",
            expected: image_labels.h,
            found: reference.h,
        });
    }
    let mut out = LabelImage::new(image_labels.w, image_labels.h);
    for label in 0..=reference.max_label() {
        let mut inside: Vec<u32> = reference
            .data
            .iter()
            .zip(&image_labels.data)
            .filter(|(&r, _)| r == label)
            .map(|(_, &l)| l)
            .collect();
        if inside.is_empty() {
            continue;
        }
        inside.sort_unstable();
        let matched = inside[(inside.len() - 1) / 2];
        for (dst, &src) in out.data.iter_mut().zip(&image_labels.data) {
            if src == matched {
                *dst = label;
            }
        }
    }
    Ok(out)
}
