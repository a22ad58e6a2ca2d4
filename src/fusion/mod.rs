//! Joint analysis of the registered ion images and the reference image.
//!
//! Ion images become the rows of an observation matrix restricted to the
//! tissue mask. NMF or PCA embeds every ion image in a low-dimensional
//! space, the reference image is projected into the same space with the
//! learnt components held fixed, and ion images are ranked by their distance
//! to the projected reference.

mod error;
mod linalg;
mod matrix;
mod nmf;
mod options;
mod pca;
mod ranking;
mod reconstruct;

pub use error::DecompositionError;
pub use matrix::{data_matrix, masked_row, Normalization};
pub use nmf::{nmf, NmfModel, NmfOptions};
pub use options::{FusionMethod, FusionOptions};
pub use pca::{pca, PcaModel};
pub use ranking::{rank_by_correlation, rank_by_distance, DistanceMetric, RankedIon};
pub use reconstruct::{component_image, reconstruct_image};

use crate::image::ImageF32;
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Method-specific fit quality.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FusionQuality {
    #[serde(rename_all = "camelCase")]
    ReconstructionError {
        error: f64,
        relative_error: f64,
        iterations: usize,
    },
    #[serde(rename_all = "camelCase")]
    ExplainedVariance { ratios: Vec<f64> },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionResult {
    pub method: FusionMethod,
    /// Embedding of every ion image, indexed like the input.
    pub coordinates: Vec<Vec<f64>>,
    /// Embedding of the reference image.
    pub reference_point: Vec<f64>,
    /// Closest ion images first, truncated to `top_n`.
    pub ranking: Vec<RankedIon>,
    pub quality: FusionQuality,
    /// Components rendered on the full image grid.
    #[serde(skip)]
    pub component_images: Vec<ImageF32>,
    /// Reference as seen through the components.
    #[serde(skip)]
    pub reference_reconstruction: ImageF32,
}

#[derive(Clone, Debug, Default)]
pub struct Fusion {
    options: FusionOptions,
}

fn rows_of(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

impl Fusion {
    pub fn new(options: FusionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FusionOptions {
        &self.options
    }

    /// Embed `ion_images` and `reference` over `mask` and rank the ion images
    /// by their distance to the reference. `mzs[i]` labels `ion_images[i]`.
    pub fn fuse(
        &self,
        ion_images: &[ImageF32],
        reference: &ImageF32,
        mask: &[bool],
        mzs: &[f64],
    ) -> Result<FusionResult, DecompositionError> {
        if mzs.len() != ion_images.len() {
            return Err(DecompositionError::ShapeMismatch {
                what: "m/z labels",
                expected: ion_images.len(),
                found: mzs.len(),
            });
        }
        let opts = &self.options;
        let x = data_matrix(ion_images, mask, opts.normalization)?;
        let reference_row = masked_row(reference, mask, opts.normalization)?;
        let k = opts.nmf.n_components;
        let (w, h) = (reference.w, reference.h);

        let (coordinates, reference_point, components, quality): (
            DMatrix<f64>,
            DVector<f64>,
            DMatrix<f64>,
            FusionQuality,
        ) = match opts.method {
            FusionMethod::Nmf => {
                let model = nmf(&x, &opts.nmf)?;
                let point = model.transform(&reference_row)?;
                let quality = FusionQuality::ReconstructionError {
                    error: model.reconstruction_error,
                    relative_error: model.reconstruction_error / x.norm().max(f64::EPSILON),
                    iterations: model.iterations,
                };
                (model.w, point, model.h, quality)
            }
            FusionMethod::Pca => {
                let model = pca(&x, k)?;
                let point = model.transform(&reference_row)?;
                let quality = FusionQuality::ExplainedVariance {
                    ratios: model.explained_variance_ratio.clone(),
                };
                (model.scores, point, model.components, quality)
            }
        };

        let mut ranking = rank_by_distance(&coordinates, &reference_point, opts.distance, mzs);
        ranking.truncate(opts.top_n.max(1));
        let component_images = (0..components.nrows())
            .map(|j| component_image(&components, j, mask, w, h))
            .collect::<Result<Vec<_>, _>>()?;
        let reference_reconstruction = reconstruct_image(&components, &reference_point, mask, w, h)?;
        debug!(
            "fusion ({:?}): {} ion images x {} pixels, k={}, best m/z={:?}",
            opts.method,
            x.nrows(),
            x.ncols(),
            components.nrows(),
            ranking.first().map(|r| r.mz)
        );

        Ok(FusionResult {
            method: opts.method,
            coordinates: rows_of(&coordinates),
            reference_point: reference_point.iter().copied().collect(),
            ranking,
            quality,
            component_images,
            reference_reconstruction,
        })
    }
}

#[cfg(test)]
mod tests;
