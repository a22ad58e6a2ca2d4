//! Multi-resolution image pyramid with configurable separable blur and 2×
//! decimation.
//!
//! Used by the registration stage to run the optimizer coarse-to-fine: level
//! 0 is the input image, every following level halves both dimensions (odd
//! sizes round up). Prior to each decimation step the separable filter
//! (Gaussian by default) is applied for the first `blur_levels` steps. Border
//! samples clamp to the image extents.

mod build;
pub mod filters;
mod options;

pub use build::Pyramid;
pub use filters::{blur, SeparableFilter, StaticSeparableFilter, GAUSSIAN_5TAP};
pub use options::PyramidOptions;
