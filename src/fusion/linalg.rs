//! Truncated SVD through the smaller Gram matrix.
//!
//! Ion-image stacks are short and wide (tens of images, thousands of
//! pixels), so the eigen decomposition of `X Xᵀ` is far cheaper than a full
//! SVD of `X`.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

const SIGMA_EPS: f64 = 1e-12;

pub(crate) struct Svd {
    /// Left singular vectors as columns (`rows × k`).
    pub u: DMatrix<f64>,
    pub sigma: DVector<f64>,
    /// Right singular vectors as rows (`k × cols`).
    pub vt: DMatrix<f64>,
    /// Every eigenvalue of the Gram matrix, descending.
    pub all_eigenvalues: Vec<f64>,
}

/// Leading `k` singular triplets of `x`, sorted by decreasing singular value.
/// Triplets with a vanishing singular value get zero vectors.
pub(crate) fn truncated_svd(x: &DMatrix<f64>, k: usize) -> Svd {
    let (rows, cols) = x.shape();
    let wide = rows <= cols;
    let gram = if wide {
        x * x.transpose()
    } else {
        x.transpose() * x
    };
    let eig = SymmetricEigen::new(gram);
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));
    let all_eigenvalues: Vec<f64> = order.iter().map(|&i| eig.eigenvalues[i].max(0.0)).collect();

    let mut u = DMatrix::zeros(rows, k);
    let mut vt = DMatrix::zeros(k, cols);
    let mut sigma = DVector::zeros(k);
    for (j, &idx) in order.iter().take(k).enumerate() {
        let s = eig.eigenvalues[idx].max(0.0).sqrt();
        sigma[j] = s;
        if s <= SIGMA_EPS {
            continue;
        }
        let vec = eig.eigenvectors.column(idx);
        if wide {
            let v = x.transpose() * vec / s;
            u.set_column(j, &vec);
            vt.set_row(j, &v.transpose());
        } else {
            let left = x * vec / s;
            u.set_column(j, &left);
            vt.set_row(j, &vec.transpose());
        }
    }
    Svd {
        u,
        sigma,
        vt,
        all_eigenvalues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_a_rank_two_matrix() {
        let x = DMatrix::from_row_slice(3, 4, &[
            1.0, 2.0, 0.0, 1.0, //
            2.0, 4.0, 0.0, 2.0, //
            0.0, 1.0, 3.0, 1.0,
        ]);
        let svd = truncated_svd(&x, 2);
        let approx = &svd.u * DMatrix::from_diagonal(&svd.sigma) * &svd.vt;
        assert!((approx - &x).norm() < 1e-9);
        assert!(svd.sigma[0] >= svd.sigma[1]);
        assert!(svd.all_eigenvalues[2].abs() < 1e-9);
    }
}
