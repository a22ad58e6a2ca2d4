//! Rigid intensity-based registration of the representative ion image onto
//! the reference image.
//!
//! The moving image is optionally resized to the reference grid, both images
//! are decomposed into Gaussian pyramids and a rigid transform
//! `p' = R(θ)(p − c) + c + t` is optimised level by level with regular-step
//! gradient descent. The metric is evaluated over the fixed-image samples that
//! map inside the moving image. Several initial rotations can be tried; the
//! start with the lowest final metric wins.
//!
//! Coordinates follow the pixel-centre convention used throughout the crate:
//! pixel `(x, y)` covers `[x − ½, x + ½] × [y − ½, y + ½]`.

mod interpolate;
mod metric;
mod optimizer;
mod options;
mod quality;
mod registrar;
mod transform;

pub use interpolate::{resample, resize_bilinear, sample_bilinear};
pub use metric::ImageMetric;
pub use optimizer::{OptimizerOutcome, RegularStepGradientDescent, StopReason};
pub use options::{InitMode, MetricKind, OptimizerOptions, RegistrationOptions};
pub use quality::dice_coefficient;
pub use registrar::{
    initialize_transform, warp_cube, LevelTrace, Registrar, RegistrationError, RegistrationResult,
};
pub use transform::RigidTransform;

#[cfg(test)]
mod tests;
