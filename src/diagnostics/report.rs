use super::timing::TimingBreakdown;
use crate::cube::MsiCube;
use crate::fusion::{FusionResult, RankedIon};
use crate::image::ImageF32;
use crate::registration::RegistrationResult;
use crate::segmentation::SegmentationResult;
use serde::Serialize;

/// Dimensions of the inputs of a fusion run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub n_mz: usize,
    pub reference_width: usize,
    pub reference_height: usize,
}

/// Peak alignment summary, present when the run started from raw spectra.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentStage {
    pub spectra: usize,
    pub detected_peaks: usize,
    pub aligned_mzs: usize,
}

/// Result of [`FusionPipeline::process_cube`](crate::FusionPipeline).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionReport {
    pub input: InputDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentStage>,
    pub segmentation: SegmentationResult,
    pub registration: RegistrationResult,
    /// Dice overlap of the warped tissue mask and the reference foreground.
    pub registration_dice: f64,
    pub fusion: FusionResult,
    /// Pearson ranking of the warped ion images, for comparison.
    pub correlation_ranking: Vec<RankedIon>,
    pub timings: TimingBreakdown,
    /// Representative ion image in the reference frame.
    #[serde(skip)]
    pub registered_representative: ImageF32,
    /// Tissue mask in the reference frame.
    #[serde(skip)]
    pub tissue_mask: Vec<bool>,
    #[serde(skip)]
    pub warped_cube: MsiCube,
}

impl FusionReport {
    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let best = self
            .fusion
            .ranking
            .first()
            .map(|r| format!("{:.4}", r.mz))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "tissue={}px angle={:.2}° t=({:.2}, {:.2}) dice={:.3} best m/z={} registration={:.1}ms total={:.1}ms",
            self.segmentation.region.area,
            self.registration.transform.angle.to_degrees(),
            self.registration.transform.translation.x,
            self.registration.transform.translation.y,
            self.registration_dice,
            best,
            self.timings.stage_ms("registration").unwrap_or(0.0),
            self.timings.total_ms
        )
    }
}
