//! Crate-level error type returned by the pipeline entry points.

use crate::fusion::DecompositionError;
use crate::registration::RegistrationError;

/// Reasons why a fusion run may fail.
#[derive(Clone, Debug, PartialEq)]
pub enum FusionError {
    /// The datacube or the spectra list contains no data.
    EmptyInput { what: &'static str },
    /// Two arrays that must agree in size do not.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A pixel coordinate lies outside the declared image grid.
    PixelOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// No peak survived detection and alignment.
    NoPeaks,
    /// Region growing produced an empty tissue mask.
    EmptySegmentation,
    Registration(RegistrationError),
    Decomposition(DecompositionError),
}

impl std::fmt::Display for FusionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionError::EmptyInput { what } => write!(f, "empty input: {what}"),
            FusionError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(f, "{what}: expected {expected} elements, found {found}"),
            FusionError::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "pixel ({x}, {y}) outside {width}x{height} grid"),
            FusionError::NoPeaks => write!(f, "no peaks left after detection and alignment"),
            FusionError::EmptySegmentation => write!(f, "segmentation produced an empty region"),
            FusionError::Registration(e) => write!(f, "registration failed: {e}"),
            FusionError::Decomposition(e) => write!(f, "decomposition failed: {e}"),
        }
    }
}

impl std::error::Error for FusionError {}

impl From<RegistrationError> for FusionError {
    fn from(e: RegistrationError) -> Self {
        FusionError::Registration(e)
    }
}

impl From<DecompositionError> for FusionError {
    fn from(e: DecompositionError) -> Self {
        FusionError::Decomposition(e)
    }
}
