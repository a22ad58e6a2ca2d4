//! Global thresholds and seed placement on a single image.

use super::components::neighbors;
use super::options::SeedOptions;
use crate::image::ImageF32;
use crate::stats::percentile;

/// Otsu threshold over a `bins`-bin histogram of the finite pixel values.
/// A constant image returns its value.
pub fn otsu_threshold(image: &ImageF32, bins: usize) -> f32 {
    let Some((lo, hi)) = image.min_max() else {
        return 0.0;
    };
    let bins = bins.max(2);
    let range = hi - lo;
    if range <= f32::EPSILON {
        return lo;
    }
    let mut hist = vec![0usize; bins];
    for &v in image.data.iter().filter(|v| v.is_finite()) {
        let b = (((v - lo) / range) * bins as f32) as usize;
        hist[b.min(bins - 1)] += 1;
    }
    let total: usize = hist.iter().sum();
    let sum_all: f64 = hist.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();

    let mut best = (0usize, f64::NEG_INFINITY);
    let mut weight_bg = 0usize;
    let mut sum_bg = 0.0f64;
    for (t, &count) in hist.iter().enumerate().take(bins - 1) {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += t as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let between = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);
        if between > best.1 {
            best = (t, between);
        }
    }
    lo + range * (best.0 + 1) as f32 / bins as f32
}

/// Seeds as `(x, y)`. Explicit points win; otherwise the brightest pixels at
/// or above the seed percentile are taken greedily, `spacing` apart. Pixels
/// whose whole 8-neighbourhood clears the percentile are preferred.
pub fn select_seeds(image: &ImageF32, options: &SeedOptions) -> Vec<(usize, usize)> {
    if !options.points.is_empty() {
        return options
            .points
            .iter()
            .filter(|p| p[0] < image.w && p[1] < image.h)
            .map(|p| (p[0], p[1]))
            .collect();
    }
    let values: Vec<f64> = image.data.iter().map(|&v| v as f64).collect();
    let Some(threshold) = percentile(&values, options.percentile) else {
        return Vec::new();
    };
    let bright = |i: usize| image.data[i].is_finite() && image.data[i] as f64 >= threshold;
    let mut candidates: Vec<usize> = (0..image.len())
        .filter(|&i| bright(i) && neighbors(i, image.w, image.h).all(bright))
        .collect();
    if candidates.is_empty() {
        candidates = (0..image.len()).filter(|&i| bright(i)).collect();
    }
    candidates.sort_by(|&a, &b| image.data[b].total_cmp(&image.data[a]).then(a.cmp(&b)));

    let mut seeds: Vec<(usize, usize)> = Vec::new();
    for idx in candidates {
        if seeds.len() >= options.max_seeds.max(1) {
            break;
        }
        let (x, y) = (idx % image.w, idx / image.w);
        let far_enough = seeds
            .iter()
            .all(|&(sx, sy)| sx.abs_diff(x).max(sy.abs_diff(y)) >= options.spacing);
        if far_enough {
            seeds.push((x, y));
        }
    }
    seeds
}
