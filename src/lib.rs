#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod cube;
pub mod diagnostics;
pub mod error;
pub mod fusion;
pub mod image;
pub mod pipeline;
pub mod registration;
pub mod segmentation;
pub mod spectra;

// Building blocks shared by the stages and the command-line tools.
pub mod angle;
pub mod config;
pub mod pyramid;
pub mod stats;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pipeline + results.
pub use crate::error::FusionError;
pub use crate::pipeline::{FusionParams, FusionPipeline};

// Reports returned by the pipeline.
pub use crate::diagnostics::{FusionReport, TimingBreakdown};

// Stage drivers, usable on their own.
pub use crate::fusion::{Fusion, FusionResult};
pub use crate::registration::{Registrar, RegistrationResult, RigidTransform};
pub use crate::segmentation::{SegmentationResult, Segmenter};
pub use crate::spectra::{AlignedSpectra, PeakAligner};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use msi_fusion::prelude::*;
///
/// # fn main() -> Result<(), FusionError> {
/// let (w, h) = (32usize, 24usize);
/// let images = vec![ImageF32::new(w, h); 4];
/// let cube = MsiCube::from_ion_images(vec![100.0, 200.0, 300.0, 400.0], &images)?;
/// let reference = ImageF32::new(64, 48);
///
/// let pipeline = FusionPipeline::new(FusionParams::default());
/// let report = pipeline.process_cube(&cube, &reference)?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::cube::MsiCube;
    pub use crate::image::{ImageF32, LabelImage};
    pub use crate::spectra::{PixelSpectrum, Spectrum};
    pub use crate::{FusionError, FusionParams, FusionPipeline, FusionReport};
}
