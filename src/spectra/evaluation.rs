//! Realignment quality measures.
//!
//! Compares the peak indices kept after realignment with reference peak
//! indices (typically picked on the max spectrum of the raw data) on a shared
//! sampling axis. Index sets use first-occurrence order and set semantics.

use super::alignment::AlignedSpectra;
use super::peaks::{PeakDetector, PeakOptions};
use super::spectrum::{spectra_max, PixelSpectrum, Spectrum};
use crate::error::FusionError;
use crate::stats::{mean_std, median};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// For each index in `a`, the nearest index in `b` when closer than `max_distance`.
pub fn realign_close_peaks(a: &[usize], b: &[usize], max_distance: usize) -> Vec<usize> {
    a.iter()
        .filter_map(|&v| nearest(b, v).filter(|&n| n.abs_diff(v) < max_distance))
        .collect()
}

/// Distance from every index of `a` to its nearest neighbour in `b`.
pub fn nearest_distances(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter()
        .filter_map(|&v| nearest(b, v).map(|n| n.abs_diff(v)))
        .collect()
}

fn nearest(candidates: &[usize], value: usize) -> Option<usize> {
    candidates.iter().copied().min_by_key(|&c| c.abs_diff(value))
}

fn ordered_unique(values: &[usize]) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().copied().filter(|v| seen.insert(*v)).collect()
}

fn intersection_len(a: &[usize], b: &[usize]) -> usize {
    let set_b: HashSet<usize> = b.iter().copied().collect();
    ordered_unique(a).into_iter().filter(|v| set_b.contains(v)).count()
}

/// Fraction of the distinct elements of `a` also present in `b`.
pub fn precision(a: &[usize], b: &[usize]) -> f64 {
    let n = ordered_unique(a).len();
    if n == 0 {
        0.0
    } else {
        intersection_len(a, b) as f64 / n as f64
    }
}

/// Fraction of the distinct elements of `b` also present in `a`.
pub fn recall(a: &[usize], b: &[usize]) -> f64 {
    let n = ordered_unique(b).len();
    if n == 0 {
        0.0
    } else {
        intersection_len(a, b) as f64 / n as f64
    }
}

/// Distinct elements of `b` absent from `a`, in order of appearance in `b`.
pub fn missing_indices(a: &[usize], b: &[usize]) -> Vec<usize> {
    let set_a: HashSet<usize> = a.iter().copied().collect();
    ordered_unique(b)
        .into_iter()
        .filter(|v| !set_a.contains(v))
        .collect()
}

/// Fraction of values at or below `median + sigma`.
pub fn noise_proportion(values: &[f64], median: f64, sigma: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let below = values.iter().filter(|&&v| v <= median + sigma).count();
    below as f64 / values.len() as f64
}

/// Share of intensity retained by a reduced representation.
pub fn intensity_ratio(reduced: f64, full: f64) -> f64 {
    if full == 0.0 {
        0.0
    } else {
        reduced / full
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    /// Peaks further apart than this many samples are not matched.
    pub max_distance: usize,
    /// Missing peaks at or below `median + factor · median` count as noise.
    pub noise_factor: f64,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self {
            max_distance: 10,
            noise_factor: 3.0,
        }
    }
}

/// Inputs of a realignment quality evaluation.
#[derive(Clone, Copy, Debug)]
pub struct RealignmentInput<'a> {
    /// Sample indices kept after realignment.
    pub realigned_indices: &'a [usize],
    /// Sample indices of peaks picked on the reference spectrum.
    pub reference_indices: &'a [usize],
    /// Reference spectrum intensities (e.g. the max spectrum).
    pub reference_spectrum: &'a [f64],
    /// All raw intensities, used for the noise level.
    pub full_intensities: &'a [f64],
    pub realigned_total: f64,
    pub full_total: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealignmentQuality {
    pub precision: f64,
    pub recall: f64,
    pub missing: Vec<usize>,
    pub missing_max: f64,
    pub missing_median: f64,
    pub missing_mean: f64,
    pub missing_std: f64,
    pub noise_proportion: f64,
    pub intensity_ratio: f64,
    /// Median distance, in axis samples, from each realigned peak to the
    /// nearest reference peak.
    pub offset_median: f64,
}

impl RealignmentQuality {
    pub fn evaluate(input: &RealignmentInput<'_>, options: &QualityOptions) -> Self {
        let realigned = realign_close_peaks(
            input.realigned_indices,
            input.reference_indices,
            options.max_distance,
        );
        let reference = realign_close_peaks(
            input.reference_indices,
            input.realigned_indices,
            options.max_distance,
        );
        let missing = missing_indices(input.realigned_indices, input.reference_indices);
        let missing_values: Vec<f64> = missing
            .iter()
            .filter_map(|&i| input.reference_spectrum.get(i).copied())
            .collect();
        let (missing_mean, missing_std) = mean_std(&missing_values);
        let offsets: Vec<f64> = nearest_distances(input.realigned_indices, input.reference_indices)
            .into_iter()
            .map(|d| d as f64)
            .collect();
        let full_median = median(input.full_intensities).unwrap_or(0.0);

        Self {
            precision: precision(&realigned, &reference),
            recall: recall(&realigned, &reference),
            missing_max: missing_values.iter().copied().fold(0.0, f64::max),
            missing_median: median(&missing_values).unwrap_or(0.0),
            missing_mean,
            missing_std,
            noise_proportion: noise_proportion(
                &missing_values,
                full_median,
                options.noise_factor * full_median,
            ),
            intensity_ratio: intensity_ratio(input.realigned_total, input.full_total),
            offset_median: median(&offsets).unwrap_or(0.0),
            missing,
        }
    }
}

/// Index of the axis sample closest to `mz`. The axis must be ascending.
fn nearest_index(axis: &[f64], mz: f64) -> Option<usize> {
    if axis.is_empty() {
        return None;
    }
    let pos = axis.partition_point(|&v| v < mz);
    let candidates = [pos.checked_sub(1), (pos < axis.len()).then_some(pos)];
    candidates
        .into_iter()
        .flatten()
        .min_by(|&a, &b| (axis[a] - mz).abs().total_cmp(&(axis[b] - mz).abs()))
}

/// Realignment quality of `aligned` against peaks picked on the max spectrum
/// of the raw `pixels`, which must share one m/z axis.
pub fn realignment_quality(
    pixels: &[PixelSpectrum],
    aligned: &AlignedSpectra,
    peaks: PeakOptions,
    options: &QualityOptions,
) -> Result<RealignmentQuality, FusionError> {
    let spectra: Vec<Spectrum> = pixels.iter().map(|p| p.spectrum.clone()).collect();
    let max_spectrum = spectra_max(&spectra)?;
    let reference_indices: Vec<usize> = PeakDetector::new(peaks)
        .detect(&max_spectrum)
        .iter()
        .map(|p| p.index)
        .collect();
    let mut realigned_indices: Vec<usize> = aligned
        .mzs
        .iter()
        .filter_map(|&mz| nearest_index(&max_spectrum.mz, mz))
        .collect();
    realigned_indices.dedup();

    let full_intensities: Vec<f64> = spectra
        .iter()
        .flat_map(|s| s.intensities.iter().copied())
        .collect();
    let full_total: f64 = full_intensities.iter().sum();
    let realigned_total: f64 = aligned
        .pixels
        .iter()
        .map(|p| p.intensities.iter().sum::<f64>())
        .sum();

    let input = RealignmentInput {
        realigned_indices: &realigned_indices,
        reference_indices: &reference_indices,
        reference_spectrum: &max_spectrum.intensities,
        full_intensities: &full_intensities,
        realigned_total,
        full_total,
    };
    Ok(RealignmentQuality::evaluate(&input, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_peaks_snap_to_nearest_within_distance() {
        let a = [5, 20, 100];
        let b = [7, 22, 60];
        assert_eq!(realign_close_peaks(&a, &b, 10), vec![7, 22]);
        assert_eq!(nearest_distances(&a, &b), vec![2, 2, 40]);
    }

    #[test]
    fn precision_recall_use_set_semantics() {
        let a = [1, 2, 2, 3];
        let b = [2, 3, 4, 5];
        assert!((precision(&a, &b) - 2.0 / 3.0).abs() < 1e-12);
        assert!((recall(&a, &b) - 0.5).abs() < 1e-12);
        assert_eq!(precision(&[], &b), 0.0);
        assert_eq!(missing_indices(&a, &b), vec![4, 5]);
    }

    #[test]
    fn evaluation_combines_measures() {
        let reference_spectrum: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let full = [1.0, 1.0, 1.0, 2.0];
        let input = RealignmentInput {
            realigned_indices: &[10, 30],
            reference_indices: &[11, 30, 45],
            reference_spectrum: &reference_spectrum,
            full_intensities: &full,
            realigned_total: 25.0,
            full_total: 100.0,
        };
        let q = RealignmentQuality::evaluate(&input, &QualityOptions::default());
        // 10 snaps to 11 on one side and 11 snaps to 10 on the other: only 30 agrees
        assert_eq!(q.precision, 0.5);
        assert_eq!(q.recall, 0.5);
        assert_eq!(q.missing, vec![11, 45]);
        assert_eq!(q.missing_max, 45.0);
        assert_eq!(q.noise_proportion, 0.0);
        assert_eq!(q.intensity_ratio, 0.25);
        // offsets 1 (10 -> 11) and 0 (30 -> 30)
        assert_eq!(q.offset_median, 0.5);
    }

    #[test]
    fn aligned_peaks_match_max_spectrum_peaks() {
        use crate::spectra::{AlignmentOptions, MzTolerance, PeakAligner};
        let axis: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.1).collect();
        let pixels: Vec<PixelSpectrum> = (0..4)
            .map(|p| {
                let intensities = (0..60)
                    .map(|i| match i {
                        10 => 5.0 + p as f64,
                        40 => 3.0,
                        _ => 0.1,
                    })
                    .collect();
                PixelSpectrum {
                    x: p,
                    y: 0,
                    spectrum: Spectrum::new(axis.clone(), intensities).unwrap(),
                }
            })
            .collect();
        let options = AlignmentOptions {
            tolerance: MzTolerance::Da(0.05),
            ..AlignmentOptions::default()
        };
        let aligned = PeakAligner::new(options).align(&pixels).unwrap();
        let quality =
            realignment_quality(&pixels, &aligned, options.peaks, &QualityOptions::default()).unwrap();
        assert_eq!(quality.precision, 1.0);
        assert_eq!(quality.recall, 1.0);
        assert!(quality.missing.is_empty());
        assert_eq!(quality.offset_median, 0.0);
        assert!(quality.intensity_ratio > 0.0 && quality.intensity_ratio < 1.0);
    }
}
