use serde::{Deserialize, Serialize};

/// How the tissue region is grown from the seeds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GrowthMode {
    /// Connected threshold: accept neighbours with intensity in `[lower, upper]`.
    /// A missing `lower` falls back to the Otsu threshold of the image.
    Threshold {
        lower: Option<f32>,
        upper: Option<f32>,
    },
    /// Confidence connected: the interval is `mean ± multiplier · σ`, first
    /// measured on the seed neighbourhoods and then re-estimated from the
    /// grown region `iterations` times.
    Confidence {
        multiplier: f32,
        iterations: usize,
        radius: usize,
    },
}

impl Default for GrowthMode {
    fn default() -> Self {
        GrowthMode::Confidence {
            multiplier: 2.5,
            iterations: 4,
            radius: 1,
        }
    }
}

/// Seed placement on the representative image.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    /// Explicit `[x, y]` seeds; when non-empty automatic placement is skipped.
    pub points: Vec<[usize; 2]>,
    /// Candidate seeds must reach this intensity percentile.
    pub percentile: f64,
    pub max_seeds: usize,
    /// Minimum Chebyshev distance between automatic seeds.
    pub spacing: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            percentile: 95.0,
            max_seeds: 8,
            spacing: 4,
        }
    }
}

/// Options for the spatial-coherence guided segmentation stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationOptions {
    /// Intensity percentiles at which ion images are binarised for scoring.
    pub quantiles: Vec<f64>,
    /// Minimum coherence for an ion image to join the representative image.
    pub coherence_factor: f32,
    /// Upper bound on the number of ion images averaged.
    pub max_images: usize,
    /// Gaussian smoothing of the representative image before growth.
    pub smooth: bool,
    pub seeds: SeedOptions,
    pub growth: GrowthMode,
    /// Close background pockets enclosed by the grown region.
    pub fill_holes: bool,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            quantiles: vec![70.0, 80.0, 90.0],
            coherence_factor: 0.5,
            max_images: 20,
            smooth: true,
            seeds: SeedOptions::default(),
            growth: GrowthMode::default(),
            fill_holes: true,
        }
    }
}
