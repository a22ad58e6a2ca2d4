//! Seeded region growing on a single-channel image.
//!
//! Growth is a stack-driven flood fill over 8-neighbours: a pixel joins the
//! region when its intensity lies in the current acceptance interval. The
//! confidence-connected variant derives that interval from region statistics
//! and regrows from scratch after every re-estimation, so the final region
//! is always connected to at least one seed.

use super::components::neighbors;
use super::region_accumulator::RegionAccumulator;
use crate::image::ImageF32;
use log::debug;
use serde::{Deserialize, Serialize};

/// Summary statistics of a grown region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    pub area: usize,
    pub mean: f32,
    pub std: f32,
    pub centroid: [f32; 2],
    /// Acceptance interval used by the final growth pass.
    pub lower: f32,
    pub upper: f32,
}

impl RegionStats {
    fn from_accumulator(acc: &RegionAccumulator, lower: f32, upper: f32) -> Self {
        let centroid = acc.centroid();
        Self {
            area: acc.len(),
            mean: acc.mean() as f32,
            std: acc.std() as f32,
            centroid: [centroid[0] as f32, centroid[1] as f32],
            lower,
            upper,
        }
    }

    /// Statistics of the pixels set in `mask`, keeping the given interval.
    pub(super) fn of_mask(image: &ImageF32, mask: &[bool], lower: f32, upper: f32) -> Self {
        let w = image.w;
        let mut acc = RegionAccumulator::with_capacity(mask.len());
        for (idx, _) in mask.iter().enumerate().filter(|(_, &m)| m) {
            acc.push(idx, idx % w, idx / w, image.data[idx]);
        }
        Self::from_accumulator(&acc, lower, upper)
    }
}

/// Grown region: a binary mask plus its statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub mask: Vec<bool>,
    pub stats: RegionStats,
}

pub(super) struct RegionGrower<'a> {
    image: &'a ImageF32,
    used: Vec<u8>,
    stack: Vec<usize>,
    region: RegionAccumulator,
}

impl<'a> RegionGrower<'a> {
    pub(super) fn new(image: &'a ImageF32) -> Self {
        Self {
            image,
            used: vec![0u8; image.len()],
            stack: Vec::with_capacity(64),
            region: RegionAccumulator::with_capacity(256),
        }
    }

    /// Grow from all `seeds` with the interval `[lower, upper]`.
    pub(super) fn grow(&mut self, seeds: &[(usize, usize)], lower: f32, upper: f32) -> Region {
        self.used.iter_mut().for_each(|u| *u = 0);
        self.stack.clear();
        self.region.reset();

        let (w, h) = (self.image.w, self.image.h);
        let accept = |v: f32| v.is_finite() && v >= lower && v <= upper;
        for &(x, y) in seeds {
            if x >= w || y >= h {
                continue;
            }
            let idx = y * w + x;
            if self.used[idx] == 0 && accept(self.image.data[idx]) {
                self.used[idx] = 1;
                self.stack.push(idx);
            }
        }

        while let Some(idx) = self.stack.pop() {
            self.region.push(idx, idx % w, idx / w, self.image.data[idx]);
            for n in neighbors(idx, w, h) {
                if self.used[n] == 0 && accept(self.image.data[n]) {
                    self.used[n] = 1;
                    self.stack.push(n);
                }
            }
        }

        let mut mask = vec![false; w * h];
        for &idx in &self.region.indices {
            mask[idx] = true;
        }
        Region {
            mask,
            stats: RegionStats::from_accumulator(&self.region, lower, upper),
        }
    }

    /// Mean and σ over the `(2r + 1)²` neighbourhoods of the seeds.
    fn seed_statistics(&mut self, seeds: &[(usize, usize)], radius: usize) -> (f64, f64) {
        let (w, h) = (self.image.w, self.image.h);
        self.region.reset();
        self.used.iter_mut().for_each(|u| *u = 0);
        for &(sx, sy) in seeds {
            if sx >= w || sy >= h {
                continue;
            }
            for y in sy.saturating_sub(radius)..=(sy + radius).min(h - 1) {
                for x in sx.saturating_sub(radius)..=(sx + radius).min(w - 1) {
                    let idx = y * w + x;
                    let v = self.image.data[idx];
                    if self.used[idx] == 0 && v.is_finite() {
                        self.used[idx] = 1;
                        self.region.push(idx, x, y, v);
                    }
                }
            }
        }
        self.region.mark_as(&mut self.used, 0);
        (self.region.mean(), self.region.std())
    }

    pub(super) fn grow_confident(
        &mut self,
        seeds: &[(usize, usize)],
        multiplier: f32,
        iterations: usize,
        radius: usize,
    ) -> Region {
        let (mut mean, mut std) = self.seed_statistics(seeds, radius);
        let k = multiplier.max(0.0) as f64;
        let mut region = self.grow(seeds, (mean - k * std) as f32, (mean + k * std) as f32);
        for it in 0..iterations {
            if region.stats.area == 0 {
                break;
            }
            let (next_mean, next_std) = (region.stats.mean as f64, region.stats.std as f64);
            if (next_mean - mean).abs() <= 1e-9 && (next_std - std).abs() <= 1e-9 {
                debug!("confidence growth converged after {it} re-estimations");
                break;
            }
            mean = next_mean;
            std = next_std;
            region = self.grow(seeds, (mean - k * std) as f32, (mean + k * std) as f32);
        }
        region
    }
}

/// Connected-threshold growth from `seeds` (as `(x, y)`).
pub fn region_growing(image: &ImageF32, seeds: &[(usize, usize)], lower: f32, upper: f32) -> Region {
    RegionGrower::new(image).grow(seeds, lower, upper)
}

/// Confidence-connected growth: interval `mean ± multiplier · σ` re-estimated
/// from the region `iterations` times.
pub fn adaptive_region_growing(
    image: &ImageF32,
    seeds: &[(usize, usize)],
    multiplier: f32,
    iterations: usize,
    radius: usize,
) -> Region {
    RegionGrower::new(image).grow_confident(seeds, multiplier, iterations, radius)
}
