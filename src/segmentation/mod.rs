//! Tissue segmentation guided by spatial coherence.
//!
//! The segmenter works on a single representative image built from the ion
//! images whose signal is spatially coherent:
//!
//! - Coherence scoring binarises each ion image at a few high percentiles and
//!   measures how much of the kept signal sits in one 8-connected component
//!   (see [`spatial_coherence`]).
//! - The best scoring images are min–max normalised and averaged into the
//!   representative image, optionally smoothed with the pyramid's 5-tap
//!   Gaussian.
//! - Seeds are either user supplied or the brightest, well separated pixels.
//! - Region growing is a stack-based 8-connected flood fill, either with a
//!   fixed intensity interval (Otsu when no lower bound is configured) or with
//!   a confidence interval re-estimated from the grown region.
//! - Enclosed background pockets are optionally filled.
//!
//! All thresholds are in the units of the representative image, i.e. `[0, 1]`.

mod coherence;
mod components;
mod growing;
mod labels;
mod options;
mod region_accumulator;
mod threshold;

pub use coherence::{
    representative_image, select_coherent_images, spatial_coherence, CoherenceSelection,
};
pub use components::{connected_components, fill_holes, largest_component_size};
pub use growing::{adaptive_region_growing, region_growing, Region, RegionStats};
pub use labels::homogenize_labels;
pub use options::{GrowthMode, SeedOptions, SegmentationOptions};
pub use threshold::{otsu_threshold, select_seeds};

use crate::cube::MsiCube;
use crate::error::FusionError;
use crate::image::ImageF32;
use crate::pyramid::{blur, GAUSSIAN_5TAP};
use growing::RegionGrower;
use log::debug;
use serde::Serialize;

const OTSU_BINS: usize = 256;

/// Output of [`Segmenter::segment`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    /// Image the region was grown on (after optional smoothing).
    #[serde(skip)]
    pub representative: ImageF32,
    #[serde(skip)]
    pub mask: Vec<bool>,
    pub region: RegionStats,
    pub coherence: CoherenceSelection,
    pub seeds: Vec<(usize, usize)>,
}

#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    options: SegmentationOptions,
}

impl Segmenter {
    pub fn new(options: SegmentationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SegmentationOptions {
        &self.options
    }

    /// Segment the tissue region of a datacube.
    pub fn segment(&self, cube: &MsiCube) -> Result<SegmentationResult, FusionError> {
        self.segment_images(&cube.ion_images())
    }

    /// Same as [`Segmenter::segment`] on an explicit stack of ion images.
    pub fn segment_images(&self, images: &[ImageF32]) -> Result<SegmentationResult, FusionError> {
        if images.is_empty() {
            return Err(FusionError::EmptyInput { what: "ion images" });
        }
        let opts = &self.options;
        let coherence = select_coherent_images(
            images,
            &opts.quantiles,
            opts.coherence_factor,
            opts.max_images,
        );
        debug!(
            "coherence: {} of {} ion images selected (best={:.3})",
            coherence.selected.len(),
            images.len(),
            coherence
                .selected
                .first()
                .map(|&i| coherence.scores[i])
                .unwrap_or(0.0)
        );
        let representative = representative_image(images, &coherence.selected)
            .ok_or(FusionError::EmptyInput { what: "ion images" })?;
        let mut result = self.segment_image(&representative)?;
        result.coherence = coherence;
        Ok(result)
    }

    /// Grow the tissue region on an already built representative image.
    pub fn segment_image(&self, representative: &ImageF32) -> Result<SegmentationResult, FusionError> {
        if representative.is_empty() {
            return Err(FusionError::EmptyInput {
                what: "representative image",
            });
        }
        let opts = &self.options;
        let image = if opts.smooth {
            blur(representative, &GAUSSIAN_5TAP)
        } else {
            representative.clone()
        };
        let seeds = select_seeds(&image, &opts.seeds);
        if seeds.is_empty() {
            return Err(FusionError::EmptySegmentation);
        }

        let mut grower = RegionGrower::new(&image);
        let mut region = match opts.growth {
            GrowthMode::Threshold { lower, upper } => {
                let lower = lower.unwrap_or_else(|| otsu_threshold(&image, OTSU_BINS));
                grower.grow(&seeds, lower, upper.unwrap_or(f32::INFINITY))
            }
            GrowthMode::Confidence {
                multiplier,
                iterations,
                radius,
            } => grower.grow_confident(&seeds, multiplier, iterations, radius),
        };
        if region.stats.area == 0 {
            return Err(FusionError::EmptySegmentation);
        }
        if opts.fill_holes {
            region.mask = fill_holes(&region.mask, image.w, image.h);
            region.stats =
                RegionStats::of_mask(&image, &region.mask, region.stats.lower, region.stats.upper);
        }
        debug!(
            "segmentation: area={} mean={:.3} interval=[{:.3}, {:.3}] seeds={}",
            region.stats.area,
            region.stats.mean,
            region.stats.lower,
            region.stats.upper,
            seeds.len()
        );

        Ok(SegmentationResult {
            representative: image,
            mask: region.mask,
            region: region.stats,
            coherence: CoherenceSelection::default(),
            seeds,
        })
    }
}
