use crate::image::ImageF32;
use crate::stats::pearson;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// `1 − cos` of the angle between the two points.
    Cosine,
}

impl DistanceMetric {
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
                if na <= f64::EPSILON || nb <= f64::EPSILON {
                    1.0
                } else {
                    1.0 - dot / (na * nb)
                }
            }
        }
    }
}

/// One ion image in a ranking.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIon {
    pub index: usize,
    pub mz: f64,
    /// Distance (lower is closer) or correlation (higher is closer),
    /// depending on the ranking.
    pub score: f64,
}

/// Rank the rows of `points` by their distance to `reference`, closest
/// first. Ties keep index order.
pub fn rank_by_distance(
    points: &DMatrix<f64>,
    reference: &DVector<f64>,
    metric: DistanceMetric,
    mzs: &[f64],
) -> Vec<RankedIon> {
    let reference = reference.as_slice();
    let mut ranked: Vec<RankedIon> = (0..points.nrows())
        .map(|i| {
            let row: Vec<f64> = points.row(i).iter().copied().collect();
            RankedIon {
                index: i,
                mz: mzs.get(i).copied().unwrap_or(f64::NAN),
                score: metric.distance(&row, reference),
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.index.cmp(&b.index)));
    ranked
}

/// Pearson correlation of every image with the reference over the mask,
/// most correlated first.
pub fn rank_by_correlation(
    images: &[ImageF32],
    reference: &ImageF32,
    mask: &[bool],
    mzs: &[f64],
) -> Vec<RankedIon> {
    let masked = |img: &ImageF32| -> Vec<f64> {
        img.data
            .iter()
            .zip(mask)
            .filter(|(_, &m)| m)
            .map(|(&v, _)| v as f64)
            .collect()
    };
    let target = masked(reference);
    let mut ranked: Vec<RankedIon> = images
        .iter()
        .enumerate()
        .map(|(i, img)| RankedIon {
            index: i,
            mz: mzs.get(i).copied().unwrap_or(f64::NAN),
            score: pearson(&masked(img), &target),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_ranks_first_and_ties_keep_order() {
        let points = DMatrix::from_row_slice(4, 2, &[3.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.5, 0.5]);
        let reference = DVector::from_vec(vec![1.0, 0.0]);
        let ranked = rank_by_distance(&points, &reference, DistanceMetric::Euclidean, &[10.0, 20.0, 30.0, 40.0]);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
        assert_eq!(ranked[0].mz, 20.0);

        let cosine = rank_by_distance(&points, &reference, DistanceMetric::Cosine, &[]);
        // rows 0 and 1 are parallel to the reference: tie broken by index
        assert_eq!(cosine[0].index, 0);
        assert_eq!(cosine[1].index, 1);
        assert!(cosine[0].mz.is_nan());
    }

    #[test]
    fn correlation_ranking_is_descending() {
        let reference = ImageF32::from_vec(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let same = reference.clone();
        let flipped = ImageF32::from_vec(2, 2, vec![3.0, 2.0, 1.0, 0.0]).unwrap();
        let ranked = rank_by_correlation(&[flipped, same], &reference, &[true; 4], &[1.0, 2.0]);
        assert_eq!(ranked[0].index, 1);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert!((ranked[1].score + 1.0).abs() < 1e-9);
    }
}
