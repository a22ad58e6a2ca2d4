//! Pipeline driving the fusion end-to-end.
//!
//! Typical usage:
//! ```no_run
//! use msi_fusion::{FusionParams, FusionPipeline};
//! use msi_fusion::cube::MsiCube;
//! use msi_fusion::image::ImageF32;
//!
//! # fn example(cube: MsiCube, reference: ImageF32) {
//! let pipeline = FusionPipeline::new(FusionParams::default());
//! match pipeline.process_cube(&cube, &reference) {
//!     Ok(report) => println!("{}", report.summary()),
//!     Err(err) => eprintln!("fusion failed: {err}"),
//! }
//! # }
//! ```
use super::params::FusionParams;
use crate::cube::MsiCube;
use crate::diagnostics::{
    elapsed_ms, AlignmentStage, FusionReport, InputDescriptor, StageTiming, TimingBreakdown,
};
use crate::error::FusionError;
use crate::fusion::{rank_by_correlation, Fusion};
use crate::image::{mask_area, ImageF32};
use crate::registration::{dice_coefficient, warp_cube, Registrar};
use crate::segmentation::{otsu_threshold, Segmenter};
use crate::spectra::{PeakAligner, PixelSpectrum};
use log::debug;
use std::time::Instant;

/// Stages are stateless; the pipeline only owns their configuration.
#[derive(Clone, Debug, Default)]
pub struct FusionPipeline {
    params: FusionParams,
}

impl FusionPipeline {
    pub fn new(params: FusionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FusionParams {
        &self.params
    }

    /// Align raw pixel spectra on a `width × height` grid, then fuse.
    pub fn process_spectra(
        &self,
        pixels: &[PixelSpectrum],
        width: usize,
        height: usize,
        reference: &ImageF32,
    ) -> Result<FusionReport, FusionError> {
        let start = Instant::now();
        let aligned = PeakAligner::new(self.params.alignment).align(pixels)?;
        let cube = MsiCube::from_spectra(width, height, &aligned)?;
        let align_ms = elapsed_ms(start);

        let mut report = self.process_cube(&cube, reference)?;
        report.alignment = Some(AlignmentStage {
            spectra: pixels.len(),
            detected_peaks: aligned.detected_peaks,
            aligned_mzs: aligned.mzs.len(),
        });
        report
            .timings
            .stages
            .insert(0, StageTiming::new("alignment", align_ms));
        report.timings.total_ms += align_ms;
        Ok(report)
    }

    /// Segment, register, warp and fuse a datacube against `reference`.
    pub fn process_cube(
        &self,
        cube: &MsiCube,
        reference: &ImageF32,
    ) -> Result<FusionReport, FusionError> {
        if cube.pixel_count() == 0 || cube.n_mz() == 0 {
            return Err(FusionError::EmptyInput { what: "datacube" });
        }
        if reference.is_empty() {
            return Err(FusionError::EmptyInput {
                what: "reference image",
            });
        }
        debug!(
            "FusionPipeline::process_cube start {}x{}x{} reference={}x{}",
            cube.width(),
            cube.height(),
            cube.n_mz(),
            reference.w,
            reference.h
        );
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let stage = Instant::now();
        let segmentation = Segmenter::new(self.params.segmentation.clone()).segment(cube)?;
        timings.push("segmentation", elapsed_ms(stage));

        let stage = Instant::now();
        let fixed = reference.normalized();
        let registration = Registrar::new(self.params.registration.clone())
            .register(&fixed, &segmentation.representative)?;
        timings.push("registration", elapsed_ms(stage));

        let stage = Instant::now();
        // TIC scaling is for fusion only: it lifts background noise to the
        // level of tissue signal, which would mislead segmentation.
        let warped_cube = if self.params.normalize_tic {
            let mut normalized = cube.clone();
            normalized.normalize_tic();
            warp_cube(&normalized, &registration, fixed.w, fixed.h)?
        } else {
            warp_cube(cube, &registration, fixed.w, fixed.h)?
        };
        let tissue_mask = registration.warp_mask(&segmentation.mask, cube.width(), cube.height());
        let registered_representative = registration.warp(&segmentation.representative);
        let threshold = otsu_threshold(&fixed, 256);
        let foreground: Vec<bool> = fixed.data.iter().map(|&v| v >= threshold).collect();
        let registration_dice = dice_coefficient(&tissue_mask, &foreground);
        timings.push("warp", elapsed_ms(stage));

        let stage = Instant::now();
        let ion_images = warped_cube.ion_images();
        let fusion = Fusion::new(self.params.fusion.clone()).fuse(
            &ion_images,
            &fixed,
            &tissue_mask,
            warped_cube.mzs(),
        )?;
        let mut correlation_ranking =
            rank_by_correlation(&ion_images, &fixed, &tissue_mask, warped_cube.mzs());
        correlation_ranking.truncate(self.params.fusion.top_n.max(1));
        timings.push("fusion", elapsed_ms(stage));

        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "FusionPipeline::process_cube done warped tissue={}px dice={registration_dice:.3} total={:.1}ms",
            mask_area(&tissue_mask),
            timings.total_ms
        );

        Ok(FusionReport {
            input: InputDescriptor {
                width: cube.width(),
                height: cube.height(),
                n_mz: cube.n_mz(),
                reference_width: reference.w,
                reference_height: reference.h,
            },
            alignment: None,
            segmentation,
            registration,
            registration_dice,
            fusion,
            correlation_ranking,
            timings,
            registered_representative,
            tissue_mask,
            warped_cube,
        })
    }
}
