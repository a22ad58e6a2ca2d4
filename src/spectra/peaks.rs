//! Prominence-based peak picking on 1D intensity signals.
//!
//! A peak is a local maximum; flat tops resolve to the middle sample of the
//! plateau. Its prominence is the height above the higher of the two
//! surrounding minima, each taken between the peak and the nearest strictly
//! higher sample on that side (or the signal edge). The detector combines a
//! fixed prominence with an optional signal-to-noise gate whose noise level
//! comes from a robust wavelet estimate.

use super::spectrum::Spectrum;
use crate::stats::median;
use serde::{Deserialize, Serialize};

/// MAD-to-σ factor for Gaussian noise.
const MAD_TO_SIGMA: f64 = 0.6745;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    pub mz: f64,
    pub intensity: f64,
    pub prominence: f64,
}

/// Options controlling peak selection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakOptions {
    /// Fixed minimum prominence (intensity units).
    pub prominence: f64,
    /// Optional multiplier of the estimated noise σ used as a prominence floor.
    pub snr: Option<f64>,
    /// Peaks lower than this intensity are discarded.
    pub min_intensity: f64,
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            prominence: 0.0,
            snr: Some(3.0),
            min_intensity: 0.0,
        }
    }
}

/// Indices of local maxima. Plateaus report their middle index (rounded down).
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let n = signal.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let mut i = 1usize;
    let i_max = n - 1;
    while i < i_max {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < i_max && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Topographic prominence of the sample at `peak`.
pub fn peak_prominence(signal: &[f64], peak: usize) -> f64 {
    let height = signal[peak];

    let mut left_min = height;
    let mut i = peak as isize;
    while i >= 0 && signal[i as usize] <= height {
        left_min = left_min.min(signal[i as usize]);
        i -= 1;
    }

    let mut right_min = height;
    let mut j = peak;
    while j < signal.len() && signal[j] <= height {
        right_min = right_min.min(signal[j]);
        j += 1;
    }

    height - left_min.max(right_min)
}

/// Indices of the local maxima whose prominence reaches `prominence`.
pub fn peak_indices(signal: &[f64], prominence: f64) -> Vec<usize> {
    local_maxima(signal)
        .into_iter()
        .filter(|&p| peak_prominence(signal, p) >= prominence)
        .collect()
}

/// Robust Gaussian noise σ from the median absolute Haar detail coefficient.
pub fn estimate_noise(values: &[f64]) -> f64 {
    let details: Vec<f64> = values
        .chunks_exact(2)
        .map(|pair| ((pair[0] - pair[1]) / std::f64::consts::SQRT_2).abs())
        .collect();
    median(&details).map_or(0.0, |mad| mad / MAD_TO_SIGMA)
}

/// Peak picker applying [`PeakOptions`] to whole spectra.
#[derive(Clone, Copy, Debug, Default)]
pub struct PeakDetector {
    options: PeakOptions,
}

impl PeakDetector {
    pub fn new(options: PeakOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PeakOptions {
        &self.options
    }

    /// Prominence threshold actually applied to `intensities`.
    pub fn effective_prominence(&self, intensities: &[f64]) -> f64 {
        let noise_floor = self
            .options
            .snr
            .map_or(0.0, |k| k * estimate_noise(intensities));
        self.options.prominence.max(noise_floor)
    }

    pub fn detect(&self, spectrum: &Spectrum) -> Vec<Peak> {
        let signal = &spectrum.intensities;
        let threshold = self.effective_prominence(signal);
        local_maxima(signal)
            .into_iter()
            .filter(|&i| signal[i] >= self.options.min_intensity)
            .filter_map(|index| {
                let prominence = peak_prominence(signal, index);
                (prominence >= threshold && prominence > 0.0).then_some(Peak {
                    index,
                    mz: spectrum.mz[index],
                    intensity: signal[index],
                    prominence,
                })
            })
            .collect()
    }
}
