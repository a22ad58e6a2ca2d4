//! Cross-spectrum peak alignment onto a shared m/z axis.
//!
//! Peaks from every pixel spectrum are pooled and sorted by m/z. A group
//! starts at the lowest unassigned m/z and absorbs following peaks while they
//! stay within the tolerance window of the group start. Groups supported by
//! too few spectra are dropped; the survivors become the aligned axis
//! (intensity-weighted mean m/z per group). Every spectrum is then projected
//! onto that axis by taking its maximum intensity inside each window.

use super::peaks::{Peak, PeakDetector, PeakOptions};
use super::spectrum::{MzTolerance, PixelSpectrum, Spectrum};
use crate::error::FusionError;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentOptions {
    pub tolerance: MzTolerance,
    /// Minimum fraction of spectra that must contain a peak of a group.
    pub min_occurrence: f64,
    pub peaks: PeakOptions,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            tolerance: MzTolerance::default(),
            min_occurrence: 0.01,
            peaks: PeakOptions::default(),
        }
    }
}

/// Pixel intensities sampled on the aligned m/z axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignedPixel {
    pub x: usize,
    pub y: usize,
    pub intensities: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSpectra {
    pub mzs: Vec<f64>,
    pub pixels: Vec<AlignedPixel>,
    /// Number of peaks detected before alignment, summed over pixels.
    pub detected_peaks: usize,
}

/// Build the aligned m/z axis from per-spectrum peak lists.
pub fn align_peaks(peak_lists: &[Vec<Peak>], options: &AlignmentOptions) -> Vec<f64> {
    let mut pooled: Vec<(f64, f64, usize)> = peak_lists
        .iter()
        .enumerate()
        .flat_map(|(s, peaks)| peaks.iter().map(move |p| (p.mz, p.intensity, s)))
        .filter(|(mz, _, _)| mz.is_finite())
        .collect();
    if pooled.is_empty() {
        return Vec::new();
    }
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let needed = (options.min_occurrence.clamp(0.0, 1.0) * peak_lists.len() as f64).ceil() as usize;
    let needed = needed.max(1);

    let mut aligned = Vec::new();
    let mut start = 0usize;
    while start < pooled.len() {
        let anchor = pooled[start].0;
        let window = options.tolerance.window(anchor);
        let mut end = start + 1;
        while end < pooled.len() && pooled[end].0 - anchor <= window {
            end += 1;
        }
        let group = &pooled[start..end];
        let mut owners: Vec<usize> = group.iter().map(|g| g.2).collect();
        owners.sort_unstable();
        owners.dedup();
        if owners.len() >= needed {
            aligned.push(group_center(group));
        }
        start = end;
    }
    aligned
}

fn group_center(group: &[(f64, f64, usize)]) -> f64 {
    let total: f64 = group.iter().map(|g| g.1.max(0.0)).sum();
    if total > 0.0 {
        group.iter().map(|g| g.0 * g.1.max(0.0)).sum::<f64>() / total
    } else {
        group.iter().map(|g| g.0).sum::<f64>() / group.len() as f64
    }
}

/// Project a spectrum onto `aligned_mzs` (ascending). Each bin receives the
/// largest intensity found within tolerance, or zero.
pub fn realign_spectrum(spectrum: &Spectrum, aligned_mzs: &[f64], tolerance: MzTolerance) -> Vec<f64> {
    aligned_mzs
        .iter()
        .map(|&target| {
            let window = tolerance.window(target);
            let lo = spectrum.mz.partition_point(|&m| m < target - window);
            let hi = spectrum.mz.partition_point(|&m| m <= target + window);
            spectrum.intensities[lo..hi.max(lo)]
                .iter()
                .copied()
                .fold(0.0, f64::max)
        })
        .collect()
}

/// Detect, align and realign all pixel spectra of an acquisition.
#[derive(Clone, Copy, Debug, Default)]
pub struct PeakAligner {
    options: AlignmentOptions,
}

impl PeakAligner {
    pub fn new(options: AlignmentOptions) -> Self {
        Self { options }
    }

    pub fn align(&self, pixels: &[PixelSpectrum]) -> Result<AlignedSpectra, FusionError> {
        if pixels.is_empty() {
            return Err(FusionError::EmptyInput { what: "pixel spectra" });
        }
        let detector = PeakDetector::new(self.options.peaks);
        let peak_lists = detect_all(&detector, pixels);
        let detected_peaks = peak_lists.iter().map(Vec::len).sum();

        let mzs = align_peaks(&peak_lists, &self.options);
        debug!(
            "PeakAligner: {} spectra, {} peaks detected, {} aligned m/z",
            pixels.len(),
            detected_peaks,
            mzs.len()
        );
        if mzs.is_empty() {
            return Err(FusionError::NoPeaks);
        }

        let tolerance = self.options.tolerance;
        let pixels = pixels
            .iter()
            .map(|p| AlignedPixel {
                x: p.x,
                y: p.y,
                intensities: realign_spectrum(&p.spectrum, &mzs, tolerance),
            })
            .collect();
        Ok(AlignedSpectra {
            mzs,
            pixels,
            detected_peaks,
        })
    }
}

#[cfg(feature = "parallel")]
fn detect_all(detector: &PeakDetector, pixels: &[PixelSpectrum]) -> Vec<Vec<Peak>> {
    use rayon::prelude::*;
    pixels
        .par_iter()
        .map(|p| detector.detect(&p.spectrum))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn detect_all(detector: &PeakDetector, pixels: &[PixelSpectrum]) -> Vec<Vec<Peak>> {
    pixels.iter().map(|p| detector.detect(&p.spectrum)).collect()
}
