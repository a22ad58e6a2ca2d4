use serde::{Deserialize, Serialize};

/// Similarity measure between the fixed image and the resampled moving
/// image. All variants are expressed so that lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MetricKind {
    MeanSquares,
    /// Negated Pearson correlation.
    NormalizedCorrelation,
    /// Negated mutual information over a soft-binned joint histogram.
    MutualInformation { bins: usize },
}

impl Default for MetricKind {
    fn default() -> Self {
        MetricKind::MutualInformation { bins: 32 }
    }
}

/// Initial alignment before optimisation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitMode {
    /// Align the geometric image centres.
    #[default]
    Geometry,
    /// Align the intensity centroids.
    Moments,
}

/// Regular-step gradient descent parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerOptions {
    /// Initial step length in scaled parameter units.
    pub learning_rate: f64,
    pub min_step: f64,
    /// Step multiplier applied whenever the gradient changes direction.
    pub relaxation_factor: f64,
    pub gradient_tolerance: f64,
    pub max_iterations: usize,
    /// Finite-difference half width in scaled parameter units.
    pub finite_difference: f64,
    /// Per-parameter scales for `[θ, tx, ty]`. A scale `s` makes a unit
    /// scaled step move the parameter by `1 / s`.
    pub scales: [f64; 3],
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            learning_rate: 2.0,
            min_step: 1e-3,
            relaxation_factor: 0.5,
            gradient_tolerance: 1e-6,
            max_iterations: 200,
            finite_difference: 0.25,
            scales: [50.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationOptions {
    pub metric: MetricKind,
    pub optimizer: OptimizerOptions,
    pub initialization: InitMode,
    /// Number of pyramid levels for coarse-to-fine registration.
    pub pyramid_levels: usize,
    /// Rotations (degrees) each registration is started from.
    pub initial_angles_deg: Vec<f64>,
    /// Resize the moving image to the fixed image dimensions first.
    pub resize_moving: bool,
    /// Fixed-image sampling stride used by the metric.
    pub sampling_stride: usize,
    /// Minimum share of fixed samples that must land in the moving image.
    pub min_overlap: f64,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            metric: MetricKind::default(),
            optimizer: OptimizerOptions::default(),
            initialization: InitMode::default(),
            pyramid_levels: 3,
            initial_angles_deg: vec![0.0],
            resize_moving: true,
            sampling_stride: 1,
            min_overlap: 0.25,
        }
    }
}
