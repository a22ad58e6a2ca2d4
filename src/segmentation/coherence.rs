//! Spatial coherence of ion images.
//!
//! An ion image is binarised at several high intensity percentiles. For each
//! binarisation the coherence is the share of the kept pixels that belong to
//! the largest 8-connected component. Structured ion distributions keep
//! their bright pixels together and score close to 1; noise-like images
//! fragment and score low. The image score is the minimum over percentiles.

use super::components::largest_component_size;
use crate::image::ImageF32;
use crate::stats::percentile_sorted;
use serde::{Deserialize, Serialize};

/// Coherence of a single image (see module docs). Percentiles are taken over
/// the finite non-zero intensities; images without any score 0.
pub fn spatial_coherence(image: &ImageF32, quantiles: &[f64]) -> f32 {
    let mut nonzero: Vec<f64> = image
        .data
        .iter()
        .filter(|v| v.is_finite() && **v != 0.0)
        .map(|&v| v as f64)
        .collect();
    if nonzero.is_empty() || quantiles.is_empty() {
        return 0.0;
    }
    nonzero.sort_by(|a, b| a.total_cmp(b));

    let mut score = 1.0f32;
    for &q in quantiles {
        let threshold = percentile_sorted(&nonzero, q);
        let mask: Vec<bool> = image
            .data
            .iter()
            .map(|&v| v.is_finite() && v != 0.0 && v as f64 >= threshold)
            .collect();
        let kept = mask.iter().filter(|&&m| m).count();
        if kept == 0 {
            return 0.0;
        }
        let largest = largest_component_size(&mask, image.w, image.h);
        score = score.min(largest as f32 / kept as f32);
    }
    score
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceSelection {
    /// Coherence of every ion image, indexed like the input.
    pub scores: Vec<f32>,
    /// Selected image indices, by decreasing coherence.
    pub selected: Vec<usize>,
}

/// Score all images and keep the coherent ones. When nothing clears
/// `factor`, the single best-scoring image is kept.
pub fn select_coherent_images(
    images: &[ImageF32],
    quantiles: &[f64],
    factor: f32,
    max_images: usize,
) -> CoherenceSelection {
    let scores = score_all(images, quantiles);
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    let mut selected: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| scores[i] >= factor)
        .take(max_images.max(1))
        .collect();
    if selected.is_empty() {
        selected.extend(order.first().copied());
    }
    CoherenceSelection { scores, selected }
}

#[cfg(feature = "parallel")]
fn score_all(images: &[ImageF32], quantiles: &[f64]) -> Vec<f32> {
    use rayon::prelude::*;
    images
        .par_iter()
        .map(|img| spatial_coherence(img, quantiles))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_all(images: &[ImageF32], quantiles: &[f64]) -> Vec<f32> {
    images
        .iter()
        .map(|img| spatial_coherence(img, quantiles))
        .collect()
}

/// Mean of the selected images after min–max normalisation.
pub fn representative_image(images: &[ImageF32], indices: &[usize]) -> Option<ImageF32> {
    let first = images.get(*indices.first()?)?;
    let mut acc = ImageF32::new(first.w, first.h);
    let mut count = 0usize;
    for &i in indices {
        let Some(img) = images.get(i).filter(|img| img.same_shape(first)) else {
            continue;
        };
        for (a, v) in acc.data.iter_mut().zip(img.normalized().data) {
            *a += v;
        }
        count += 1;
    }
    let inv = 1.0 / count.max(1) as f32;
    acc.data.iter_mut().for_each(|v| *v *= inv);
    Some(acc)
}
