use super::interpolate::{resample_with, resize_bilinear};
use super::metric::ImageMetric;
use super::optimizer::{RegularStepGradientDescent, StopReason};
use super::options::{InitMode, MetricKind, RegistrationOptions};
use super::transform::RigidTransform;
use crate::cube::MsiCube;
use crate::error::FusionError;
use crate::image::ImageF32;
use crate::pyramid::{Pyramid, PyramidOptions};
use log::{debug, warn};
use nalgebra::{DVector, Vector2};
use serde::Serialize;

/// Reasons why a registration run may fail.
#[derive(Clone, Debug, PartialEq)]
pub enum RegistrationError {
    EmptyImage { which: &'static str },
    /// No start pose maps enough fixed samples inside the moving image.
    NoOverlap,
    /// Every start ended with an undefined metric.
    NoDefinedMetric,
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::EmptyImage { which } => write!(f, "{which} image is empty"),
            RegistrationError::NoOverlap => {
                write!(f, "fixed and moving images do not overlap at any start pose")
            }
            RegistrationError::NoDefinedMetric => {
                write!(f, "registration metric undefined for every start pose")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Optimisation summary of one pyramid level.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTrace {
    pub start_angle_deg: f64,
    pub level: usize,
    pub width: usize,
    pub height: usize,
    pub iterations: usize,
    pub metric: Option<f64>,
    pub stop_reason: StopReason,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    /// Maps fixed coordinates into the (resized) moving image.
    pub transform: RigidTransform,
    pub metric_kind: MetricKind,
    /// Final metric at full resolution.
    pub metric: f64,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub start_angle_deg: f64,
    pub levels: Vec<LevelTrace>,
    /// `(sx, sy)` applied to the moving image before registration.
    pub resize_scale: [f64; 2],
    pub fixed_size: [usize; 2],
}

impl RegistrationResult {
    /// Coordinate in the original moving image of fixed pixel `p`.
    pub fn moving_coord(&self, p: Vector2<f64>) -> Vector2<f64> {
        let q = self.transform.apply(p);
        let [sx, sy] = self.resize_scale;
        Vector2::new((q.x + 0.5) / sx - 0.5, (q.y + 0.5) / sy - 0.5)
    }

    /// Resample an image on the moving grid into the fixed frame.
    pub fn warp(&self, moving: &ImageF32) -> ImageF32 {
        self.warp_to(moving, self.fixed_size[0], self.fixed_size[1])
    }

    /// Like [`RegistrationResult::warp`] on an arbitrary output grid. Samples
    /// within half a pixel of the moving border snap onto it.
    pub fn warp_to(&self, moving: &ImageF32, width: usize, height: usize) -> ImageF32 {
        let max_x = moving.w as f64 - 1.0;
        let max_y = moving.h as f64 - 1.0;
        let snap = |v: f64, max: f64| {
            if (-0.5..=max + 0.5).contains(&v) {
                v.clamp(0.0, max.max(0.0))
            } else {
                v
            }
        };
        resample_with(moving, width, height, 0.0, |p| {
            let q = self.moving_coord(p);
            Vector2::new(snap(q.x, max_x), snap(q.y, max_y))
        })
    }

    /// Warp a binary mask from the moving grid; the result keeps pixels whose
    /// interpolated coverage is at least one half.
    pub fn warp_mask(&self, mask: &[bool], moving_width: usize, moving_height: usize) -> Vec<bool> {
        let as_image = ImageF32 {
            w: moving_width,
            h: moving_height,
            stride: moving_width,
            data: mask.iter().map(|&m| if m { 1.0 } else { 0.0 }).collect(),
        };
        self.warp(&as_image).data.iter().map(|&v| v >= 0.5).collect()
    }
}

/// Initial transform with its centre on the fixed image.
pub fn initialize_transform(fixed: &ImageF32, moving: &ImageF32, mode: InitMode) -> RigidTransform {
    let geometric = |img: &ImageF32| {
        Vector2::new(
            img.w.saturating_sub(1) as f64 / 2.0,
            img.h.saturating_sub(1) as f64 / 2.0,
        )
    };
    let (cf, cm) = match mode {
        InitMode::Geometry => (geometric(fixed), geometric(moving)),
        InitMode::Moments => (
            intensity_centroid(fixed).unwrap_or_else(|| geometric(fixed)),
            intensity_centroid(moving).unwrap_or_else(|| geometric(moving)),
        ),
    };
    RigidTransform::new(0.0, cm - cf, cf)
}

fn intensity_centroid(image: &ImageF32) -> Option<Vector2<f64>> {
    let (lo, _) = image.min_max()?;
    let mut mass = 0.0f64;
    let mut acc = Vector2::zeros();
    for y in 0..image.h {
        for x in 0..image.w {
            let v = image.get(x, y);
            if v.is_finite() {
                let w = (v - lo) as f64;
                mass += w;
                acc += Vector2::new(x as f64, y as f64) * w;
            }
        }
    }
    (mass > 0.0).then(|| acc / mass)
}

/// Multi-start, coarse-to-fine rigid registration.
#[derive(Clone, Debug, Default)]
pub struct Registrar {
    options: RegistrationOptions,
}

struct StartOutcome {
    transform: RigidTransform,
    metric: f64,
    iterations: usize,
    stop_reason: StopReason,
    start_angle_deg: f64,
}

impl Registrar {
    pub fn new(options: RegistrationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RegistrationOptions {
        &self.options
    }

    /// Register `moving` onto `fixed`.
    pub fn register(
        &self,
        fixed: &ImageF32,
        moving: &ImageF32,
    ) -> Result<RegistrationResult, RegistrationError> {
        if fixed.is_empty() {
            return Err(RegistrationError::EmptyImage { which: "fixed" });
        }
        if moving.is_empty() {
            return Err(RegistrationError::EmptyImage { which: "moving" });
        }
        let opts = &self.options;
        let (moving, resize_scale) = if opts.resize_moving && !moving.same_shape(fixed) {
            (
                resize_bilinear(moving, fixed.w, fixed.h),
                [
                    fixed.w as f64 / moving.w as f64,
                    fixed.h as f64 / moving.h as f64,
                ],
            )
        } else {
            (moving.clone(), [1.0, 1.0])
        };

        let initial = initialize_transform(fixed, &moving, opts.initialization);
        let pyr_opts = PyramidOptions::new(opts.pyramid_levels.max(1));
        let (fixed_pyr, moving_pyr) = Pyramid::build_pair(fixed.clone(), moving, pyr_opts);
        let level_count = fixed_pyr.len();
        let metrics: Vec<ImageMetric> = (0..level_count)
            .map(|l| {
                ImageMetric::new(
                    &fixed_pyr.levels[l],
                    &moving_pyr.levels[l],
                    opts.metric,
                    opts.sampling_stride,
                    opts.min_overlap,
                )
            })
            .collect();

        let starts: &[f64] = if opts.initial_angles_deg.is_empty() {
            &[0.0]
        } else {
            &opts.initial_angles_deg
        };
        let optimizer = RegularStepGradientDescent::new(opts.optimizer.clone());

        let mut levels = Vec::new();
        let mut best: Option<StartOutcome> = None;
        let mut any_overlap = false;
        for &angle_deg in starts {
            let mut transform = RigidTransform::new(
                angle_deg.to_radians(),
                initial.translation,
                initial.center,
            );
            let coarse = level_count - 1;
            let coarse_scale = fixed_pyr.scale_for_index(coarse);
            if metrics[coarse].evaluate(&transform.rescaled(coarse_scale)).is_none() {
                debug!("registration start {angle_deg}°: no overlap at the initial pose");
                continue;
            }
            any_overlap = true;

            let mut iterations = 0;
            let mut stop_reason = StopReason::UndefinedCost;
            for level in (0..level_count).rev() {
                let scale = fixed_pyr.scale_for_index(level);
                let local = transform.rescaled(scale);
                let metric = &metrics[level];
                let x0 = DVector::from_column_slice(&local.parameters());
                let outcome = optimizer.minimize(
                    |x| metric.evaluate(&local.with_parameters(x.as_slice())),
                    &x0,
                );
                iterations += outcome.iterations;
                stop_reason = outcome.stop_reason;
                if outcome.value.is_some() {
                    transform = local
                        .with_parameters(outcome.position.as_slice())
                        .rescaled(1.0 / scale);
                }
                let level_image = &fixed_pyr.levels[level];
                levels.push(LevelTrace {
                    start_angle_deg: angle_deg,
                    level,
                    width: level_image.w,
                    height: level_image.h,
                    iterations: outcome.iterations,
                    metric: outcome.value,
                    stop_reason: outcome.stop_reason,
                });
            }

            let Some(metric) = metrics[0].evaluate(&transform) else {
                warn!("registration start {angle_deg}°: metric undefined at the final pose");
                continue;
            };
            debug!(
                "registration start {angle_deg}°: metric={metric:.6} angle={:.2}° t=({:.2}, {:.2})",
                transform.angle.to_degrees(),
                transform.translation.x,
                transform.translation.y
            );
            if best.as_ref().map_or(true, |b| metric < b.metric) {
                best = Some(StartOutcome {
                    transform,
                    metric,
                    iterations,
                    stop_reason,
                    start_angle_deg: angle_deg,
                });
            }
        }

        if !any_overlap {
            return Err(RegistrationError::NoOverlap);
        }
        let best = best.ok_or(RegistrationError::NoDefinedMetric)?;
        Ok(RegistrationResult {
            transform: best.transform,
            metric_kind: opts.metric,
            metric: best.metric,
            iterations: best.iterations,
            stop_reason: best.stop_reason,
            start_angle_deg: best.start_angle_deg,
            levels,
            resize_scale,
            fixed_size: [fixed.w, fixed.h],
        })
    }
}

/// Warp every ion image of `cube` into the fixed frame (`width × height`).
pub fn warp_cube(
    cube: &MsiCube,
    result: &RegistrationResult,
    width: usize,
    height: usize,
) -> Result<MsiCube, FusionError> {
    let images = warp_all(cube, result, width, height);
    MsiCube::from_ion_images(cube.mzs().to_vec(), &images)
}

#[cfg(feature = "parallel")]
fn warp_all(cube: &MsiCube, result: &RegistrationResult, width: usize, height: usize) -> Vec<ImageF32> {
    use rayon::prelude::*;
    (0..cube.n_mz())
        .into_par_iter()
        .map(|k| result.warp_to(&cube.ion_image(k), width, height))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn warp_all(cube: &MsiCube, result: &RegistrationResult, width: usize, height: usize) -> Vec<ImageF32> {
    (0..cube.n_mz())
        .map(|k| result.warp_to(&cube.ion_image(k), width, height))
        .collect()
}
