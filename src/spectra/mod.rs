//! Spectral preprocessing: peak picking, peak alignment across pixels and
//! realignment quality measures.
//!
//! The stage consumes per-pixel spectra produced by an external loader and
//! yields intensities on one shared m/z axis, ready to be scattered into an
//! [`MsiCube`](crate::cube::MsiCube).

mod alignment;
pub mod evaluation;
mod peaks;
mod spectrum;

pub use alignment::{
    align_peaks, realign_spectrum, AlignedPixel, AlignedSpectra, AlignmentOptions, PeakAligner,
};
pub use evaluation::{realignment_quality, QualityOptions, RealignmentInput, RealignmentQuality};
pub use peaks::{
    estimate_noise, local_maxima, peak_indices, peak_prominence, Peak, PeakDetector, PeakOptions,
};
pub use spectrum::{spectra_max, spectra_mean, MzTolerance, PixelSpectrum, Spectrum};
