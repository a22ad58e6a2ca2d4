//! Parameter types configuring the fusion stages.
//!
//! Every block deserialises with defaults, so a configuration file only needs
//! the knobs it changes.

use crate::fusion::FusionOptions;
use crate::registration::RegistrationOptions;
use crate::segmentation::SegmentationOptions;
use crate::spectra::AlignmentOptions;
use serde::{Deserialize, Serialize};

/// Pipeline-wide parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionParams {
    /// Peak detection and alignment, used when starting from raw spectra.
    pub alignment: AlignmentOptions,
    /// Divide every pixel spectrum by its total ion count before fusion.
    /// Segmentation and registration always see the raw intensities.
    pub normalize_tic: bool,
    pub segmentation: SegmentationOptions,
    pub registration: RegistrationOptions,
    pub fusion: FusionOptions,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            alignment: AlignmentOptions::default(),
            normalize_tic: false,
            segmentation: SegmentationOptions::default(),
            registration: RegistrationOptions::default(),
            fusion: FusionOptions::default(),
        }
    }
}
