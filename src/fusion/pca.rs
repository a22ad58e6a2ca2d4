use super::error::DecompositionError;
use super::linalg::truncated_svd;
use nalgebra::{DMatrix, DVector, RowDVector};

/// Principal component model of the rows of a data matrix.
#[derive(Clone, Debug)]
pub struct PcaModel {
    /// Column means removed before the decomposition.
    pub mean: RowDVector<f64>,
    /// Principal axes as rows, `k × cols`.
    pub components: DMatrix<f64>,
    /// Training scores, `rows × k`.
    pub scores: DMatrix<f64>,
    pub explained_variance: Vec<f64>,
    pub explained_variance_ratio: Vec<f64>,
}

impl PcaModel {
    /// Scores of a new observation.
    pub fn transform(&self, row: &RowDVector<f64>) -> Result<DVector<f64>, DecompositionError> {
        if row.len() != self.mean.len() {
            return Err(DecompositionError::ShapeMismatch {
                what: "observation",
                expected: self.mean.len(),
                found: row.len(),
            });
        }
        Ok(&self.components * (row - &self.mean).transpose())
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }
}

pub fn pca(x: &DMatrix<f64>, n_components: usize) -> Result<PcaModel, DecompositionError> {
    let (rows, cols) = x.shape();
    if rows < 2 {
        return Err(DecompositionError::TooFewObservations { found: rows });
    }
    let max = rows.min(cols);
    if n_components == 0 || n_components > max {
        return Err(DecompositionError::InvalidComponents {
            requested: n_components,
            max,
        });
    }
    let mean = x.row_mean();
    let mut centered = x.clone();
    for mut row in centered.row_iter_mut() {
        row -= &mean;
    }

    let svd = truncated_svd(&centered, n_components);
    let scores = &svd.u * DMatrix::from_diagonal(&svd.sigma);
    let dof = (rows - 1) as f64;
    let total: f64 = svd.all_eigenvalues.iter().sum::<f64>() / dof;
    let explained_variance: Vec<f64> = svd.sigma.iter().map(|s| s * s / dof).collect();
    let explained_variance_ratio = explained_variance
        .iter()
        .map(|v| if total > 0.0 { v / total } else { 0.0 })
        .collect();

    Ok(PcaModel {
        mean,
        components: svd.vt,
        scores,
        explained_variance,
        explained_variance_ratio,
    })
}
