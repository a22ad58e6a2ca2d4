//! Non-negative matrix factorisation `X ≈ W H` (Frobenius loss).
//!
//! Initialisation is NNDSVDa: the leading singular triplets are split into
//! their positive and negative parts, the dominant part of each is kept and
//! remaining zeros are filled with the mean of `X`. Lee–Seung multiplicative
//! updates then refine both factors while keeping them non-negative.

use super::error::DecompositionError;
use super::linalg::truncated_svd;
use log::debug;
use nalgebra::{DMatrix, DVector, RowDVector};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-10;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NmfOptions {
    pub n_components: usize,
    pub max_iterations: usize,
    /// Stop once the error decrease relative to the initial error drops
    /// below this value.
    pub tolerance: f64,
}

impl Default for NmfOptions {
    fn default() -> Self {
        Self {
            n_components: 5,
            max_iterations: 200,
            tolerance: 1e-4,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NmfModel {
    /// Observation coordinates, `rows × k`.
    pub w: DMatrix<f64>,
    /// Components, `k × cols`.
    pub h: DMatrix<f64>,
    /// `‖X − W H‖_F` after the last update.
    pub reconstruction_error: f64,
    pub iterations: usize,
    max_iterations: usize,
}

impl NmfModel {
    /// Coordinates of a new observation with `H` held fixed.
    pub fn transform(&self, row: &RowDVector<f64>) -> Result<DVector<f64>, DecompositionError> {
        if row.len() != self.h.ncols() {
            return Err(DecompositionError::ShapeMismatch {
                what: "observation",
                expected: self.h.ncols(),
                found: row.len(),
            });
        }
        if row.iter().any(|&v| v < 0.0) {
            return Err(DecompositionError::NegativeInput);
        }
        let k = self.h.nrows();
        let start = (row.mean().max(0.0) / k as f64).sqrt().max(EPS);
        let mut w = DVector::from_element(k, start);
        let hx = &self.h * row.transpose();
        let hht = &self.h * self.h.transpose();
        for _ in 0..self.max_iterations {
            let denom = &hht * &w;
            for j in 0..k {
                w[j] *= hx[j] / (denom[j] + EPS);
            }
        }
        Ok(w)
    }

    pub fn n_components(&self) -> usize {
        self.h.nrows()
    }
}

fn check_shape(x: &DMatrix<f64>, k: usize) -> Result<(), DecompositionError> {
    let (rows, cols) = x.shape();
    if rows < 2 {
        return Err(DecompositionError::TooFewObservations { found: rows });
    }
    let max = rows.min(cols);
    if k == 0 || k > max {
        return Err(DecompositionError::InvalidComponents { requested: k, max });
    }
    Ok(())
}

/// Positive and negative parts of a vector.
fn split_signs(v: &DVector<f64>) -> (DVector<f64>, DVector<f64>) {
    (v.map(|x| x.max(0.0)), v.map(|x| (-x).max(0.0)))
}

fn nndsvda(x: &DMatrix<f64>, k: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    let (rows, cols) = x.shape();
    let svd = truncated_svd(x, k);
    let mut w = DMatrix::zeros(rows, k);
    let mut h = DMatrix::zeros(k, cols);
    for j in 0..k {
        let s = svd.sigma[j];
        let u: DVector<f64> = svd.u.column(j).into_owned();
        let v: DVector<f64> = svd.vt.row(j).transpose();
        if j == 0 {
            // Leading singular vectors of a non-negative matrix share one sign.
            let scale = s.sqrt();
            w.set_column(0, &(u.abs() * scale));
            h.set_row(0, &(v.abs() * scale).transpose());
            continue;
        }
        let (up, un) = split_signs(&u);
        let (vp, vn) = split_signs(&v);
        let (up_n, un_n, vp_n, vn_n) = (up.norm(), un.norm(), vp.norm(), vn.norm());
        let (pos, neg) = (up_n * vp_n, un_n * vn_n);
        let (a, b, norm_a, norm_b, m) = if pos >= neg {
            (up, vp, up_n, vp_n, pos)
        } else {
            (un, vn, un_n, vn_n, neg)
        };
        if norm_a <= EPS || norm_b <= EPS {
            continue;
        }
        let lambda = (s * m).sqrt();
        w.set_column(j, &(a * (lambda / norm_a)));
        h.set_row(j, &(b * (lambda / norm_b)).transpose());
    }
    let fill = x.mean();
    w.apply(|v| {
        if *v <= EPS {
            *v = fill
        }
    });
    h.apply(|v| {
        if *v <= EPS {
            *v = fill
        }
    });
    (w, h)
}

/// Factorise the non-negative matrix `x` (`rows × cols`).
pub fn nmf(x: &DMatrix<f64>, options: &NmfOptions) -> Result<NmfModel, DecompositionError> {
    let k = options.n_components;
    check_shape(x, k)?;
    if x.iter().any(|&v| v < 0.0) {
        return Err(DecompositionError::NegativeInput);
    }
    let (mut w, mut h) = nndsvda(x, k);
    let initial_error = (x - &w * &h).norm().max(EPS);
    let mut previous = initial_error;
    let mut error = initial_error;
    let mut iterations = 0;
    while iterations < options.max_iterations {
        iterations += 1;
        // H ← H ∘ (Wᵀ X) ⊘ (Wᵀ W H)
        let wt = w.transpose();
        let numer = &wt * x;
        let denom = (&wt * &w) * &h;
        h.zip_apply(&numer.component_div(&denom.add_scalar(EPS)), |v, r| *v *= r);
        // W ← W ∘ (X Hᵀ) ⊘ (W H Hᵀ)
        let ht = h.transpose();
        let numer = x * &ht;
        let denom = &w * (&h * &ht);
        w.zip_apply(&numer.component_div(&denom.add_scalar(EPS)), |v, r| *v *= r);

        error = (x - &w * &h).norm();
        if (previous - error) / initial_error < options.tolerance {
            break;
        }
        previous = error;
    }
    debug!(
        "nmf: k={k} iterations={iterations} error={error:.6} (initial {initial_error:.6})"
    );
    Ok(NmfModel {
        w,
        h,
        reconstruction_error: error,
        iterations,
        max_iterations: options.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_two() -> DMatrix<f64> {
        let w = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 0.5]);
        let h = DMatrix::from_row_slice(2, 5, &[1.0, 2.0, 0.0, 0.0, 1.0, 0.0, 0.5, 1.0, 3.0, 0.0]);
        w * h
    }

    #[test]
    fn factorises_exact_low_rank_data() {
        let x = rank_two();
        let model = nmf(
            &x,
            &NmfOptions {
                n_components: 2,
                max_iterations: 2000,
                tolerance: 1e-9,
            },
        )
        .unwrap();
        assert!(model.w.iter().all(|&v| v >= 0.0));
        assert!(model.h.iter().all(|&v| v >= 0.0));
        let rel = model.reconstruction_error / x.norm();
        assert!(rel < 1e-2, "relative error {rel}");
    }

    #[test]
    fn transform_recovers_training_coordinates() {
        let x = rank_two();
        let model = nmf(
            &x,
            &NmfOptions {
                n_components: 2,
                max_iterations: 2000,
                tolerance: 1e-9,
            },
        )
        .unwrap();
        let row = x.row(2).into_owned();
        let coords = model.transform(&row).unwrap();
        let rebuilt = coords.transpose() * &model.h;
        assert!((rebuilt - row).norm() / x.row(2).norm() < 5e-2);
    }

    #[test]
    fn rejects_bad_component_counts_and_negative_data() {
        let x = rank_two();
        let too_many = NmfOptions {
            n_components: 5,
            ..NmfOptions::default()
        };
        assert_eq!(
            nmf(&x, &too_many).unwrap_err(),
            DecompositionError::InvalidComponents {
                requested: 5,
                max: 4
            }
        );
        let negative = -x;
        let opts = NmfOptions {
            n_components: 2,
            ..NmfOptions::default()
        };
        assert_eq!(nmf(&negative, &opts).unwrap_err(), DecompositionError::NegativeInput);
    }
}
