//! Per-m/z variability table for acquisitions laid out as a grid of spots,
//! where rows (y) are samples and columns (x) are replicates of each sample.

use super::MsiCube;
use crate::stats::mean_std;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakStatistics {
    pub mz: f64,
    /// Coefficient of variation of the per-sample (row) means.
    pub sample_variability: f64,
    pub sample_mean: f64,
    pub sample_std: f64,
    /// Coefficient of variation of the per-replicate (column) means.
    pub replicate_variability: f64,
    pub replicate_mean: f64,
    pub replicate_std: f64,
}

pub(super) fn peak_statistics(cube: &MsiCube) -> Vec<PeakStatistics> {
    let (w, h) = (cube.width(), cube.height());
    (0..cube.n_mz())
        .map(|k| {
            let img = cube.ion_image(k);
            let row_means: Vec<f64> = (0..h)
                .map(|y| (0..w).map(|x| img.get(x, y) as f64).sum::<f64>() / w as f64)
                .collect();
            let col_means: Vec<f64> = (0..w)
                .map(|x| (0..h).map(|y| img.get(x, y) as f64).sum::<f64>() / h as f64)
                .collect();
            let (sample_mean, sample_std) = mean_std(&row_means);
            let (replicate_mean, replicate_std) = mean_std(&col_means);
            PeakStatistics {
                mz: cube.mzs()[k],
                sample_variability: variation(sample_std, sample_mean),
                sample_mean,
                sample_std,
                replicate_variability: variation(replicate_std, replicate_mean),
                replicate_mean,
                replicate_std,
            }
        })
        .collect()
}

fn variation(std: f64, mean: f64) -> f64 {
    if mean.abs() <= f64::EPSILON {
        0.0
    } else {
        std / mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_are_summarised_separately() {
        // 2 replicates (x) × 2 samples (y); one m/z
        // row 0: 1, 3 -> mean 2 ; row 1: 5, 7 -> mean 6
        // col 0: 1, 5 -> mean 3 ; col 1: 3, 7 -> mean 5
        let cube = MsiCube::new(2, 2, vec![500.0], vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let stats = cube.peak_statistics();
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.mz, 500.0);
        assert_eq!(s.sample_mean, 4.0);
        assert_eq!(s.sample_std, 2.0);
        assert_eq!(s.sample_variability, 0.5);
        assert_eq!(s.replicate_mean, 4.0);
        assert_eq!(s.replicate_std, 1.0);
        assert_eq!(s.replicate_variability, 0.25);
    }
}
