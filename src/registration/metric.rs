//! Image similarity metrics evaluated on the fixed-image sample grid.

use super::interpolate::sample_bilinear;
use super::options::MetricKind;
use super::transform::RigidTransform;
use crate::image::ImageF32;
use nalgebra::{DMatrix, Vector2};

/// Metric bound to a fixed/moving pair. Intensity ranges used by mutual
/// information are computed once here so every evaluation bins identically.
#[derive(Clone, Debug)]
pub struct ImageMetric<'a> {
    fixed: &'a ImageF32,
    moving: &'a ImageF32,
    kind: MetricKind,
    stride: usize,
    min_overlap: f64,
    fixed_range: (f32, f32),
    moving_range: (f32, f32),
}

impl<'a> ImageMetric<'a> {
    pub fn new(
        fixed: &'a ImageF32,
        moving: &'a ImageF32,
        kind: MetricKind,
        stride: usize,
        min_overlap: f64,
    ) -> Self {
        Self {
            fixed,
            moving,
            kind,
            stride: stride.max(1),
            min_overlap,
            fixed_range: fixed.min_max().unwrap_or((0.0, 1.0)),
            moving_range: moving.min_max().unwrap_or((0.0, 1.0)),
        }
    }

    /// Number of fixed-image samples on the grid.
    pub fn sample_count(&self) -> usize {
        self.fixed.w.div_ceil(self.stride) * self.fixed.h.div_ceil(self.stride)
    }

    /// Fixed/moving intensity pairs for every fixed sample that maps inside
    /// the moving image.
    fn pairs(&self, transform: &RigidTransform) -> Vec<(f32, f32)> {
        let mut pairs = Vec::with_capacity(self.sample_count());
        for y in (0..self.fixed.h).step_by(self.stride) {
            for x in (0..self.fixed.w).step_by(self.stride) {
                let f = self.fixed.get(x, y);
                let q = transform.apply(Vector2::new(x as f64, y as f64));
                if let Some(m) = sample_bilinear(self.moving, q.x, q.y) {
                    if f.is_finite() && m.is_finite() {
                        pairs.push((f, m));
                    }
                }
            }
        }
        pairs
    }

    /// Metric value at `transform`; `None` when the overlap is too small or
    /// the value is not defined (e.g. constant overlap for correlation).
    pub fn evaluate(&self, transform: &RigidTransform) -> Option<f64> {
        let pairs = self.pairs(transform);
        let needed = (self.min_overlap * self.sample_count() as f64).ceil().max(2.0) as usize;
        if pairs.len() < needed {
            return None;
        }
        match self.kind {
            MetricKind::MeanSquares => Some(mean_squares(&pairs)),
            MetricKind::NormalizedCorrelation => correlation(&pairs).map(|r| -r),
            MetricKind::MutualInformation { bins } => Some(-mutual_information(
                &pairs,
                bins,
                self.fixed_range,
                self.moving_range,
            )),
        }
    }
}

fn mean_squares(pairs: &[(f32, f32)]) -> f64 {
    let sum: f64 = pairs
        .iter()
        .map(|&(f, m)| {
            let d = (f - m) as f64;
            d * d
        })
        .sum();
    sum / pairs.len() as f64
}

fn correlation(pairs: &[(f32, f32)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let (mut sf, mut sm) = (0.0f64, 0.0f64);
    for &(f, m) in pairs {
        sf += f as f64;
        sm += m as f64;
    }
    let (mf, mm) = (sf / n, sm / n);
    let (mut cov, mut vf, mut vm) = (0.0f64, 0.0f64, 0.0f64);
    for &(f, m) in pairs {
        let (df, dm) = (f as f64 - mf, m as f64 - mm);
        cov += df * dm;
        vf += df * df;
        vm += dm * dm;
    }
    let denom = (vf * vm).sqrt();
    (denom > 1e-12).then(|| cov / denom)
}

/// Position of `v` on a `[0, bins − 1]` axis and its linear-kernel split.
#[inline]
fn soft_bin(v: f32, range: (f32, f32), bins: usize) -> (usize, usize, f64) {
    let span = (range.1 - range.0).max(f32::EPSILON);
    let pos = (((v - range.0) / span).clamp(0.0, 1.0) as f64) * (bins - 1) as f64;
    let lo = (pos.floor() as usize).min(bins - 1);
    let hi = (lo + 1).min(bins - 1);
    (lo, hi, pos - lo as f64)
}

/// Mutual information (nats) of the pairs. Each sample spreads its unit
/// weight over the two nearest bins per axis, which keeps the estimate
/// continuous in the transform parameters.
fn mutual_information(
    pairs: &[(f32, f32)],
    bins: usize,
    fixed_range: (f32, f32),
    moving_range: (f32, f32),
) -> f64 {
    let bins = bins.max(2);
    let mut joint = DMatrix::<f64>::zeros(bins, bins);
    for &(f, m) in pairs {
        let (f0, f1, wf) = soft_bin(f, fixed_range, bins);
        let (m0, m1, wm) = soft_bin(m, moving_range, bins);
        joint[(f0, m0)] += (1.0 - wf) * (1.0 - wm);
        joint[(f0, m1)] += (1.0 - wf) * wm;
        joint[(f1, m0)] += wf * (1.0 - wm);
        joint[(f1, m1)] += wf * wm;
    }
    let total = joint.sum();
    if total <= 0.0 {
        return 0.0;
    }
    joint /= total;
    let pf: Vec<f64> = (0..bins).map(|i| joint.row(i).sum()).collect();
    let pm: Vec<f64> = (0..bins).map(|j| joint.column(j).sum()).collect();
    let mut mi = 0.0;
    for i in 0..bins {
        for j in 0..bins {
            let p = joint[(i, j)];
            if p > 0.0 && pf[i] > 0.0 && pm[j] > 0.0 {
                mi += p * (p / (pf[i] * pm[j])).ln();
            }
        }
    }
    mi
}
