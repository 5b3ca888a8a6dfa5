//! # Decomposition Model
//!
//! Holds a precomputed singular value decomposition `A ≈ U · diag(S) · VT` of a
//! spatiotemporal field and derives principal components from it. The
//! decomposition itself is computed elsewhere; this module only validates
//! shapes and slices modes.

use crate::error::{HindcastError, HindcastResult};
use log::warn;
use nalgebra::{DMatrix, DVector};

/// Three-matrix decomposition of a field with `n_space` points and `n_time` steps
///
/// - `u`: `n_space × k` spatial patterns (EOFs)
/// - `s`: `k` singular values, expected in descending order
/// - `vt`: `k × n_time` normalized temporal amplitudes
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    u: DMatrix<f64>,
    s: DVector<f64>,
    vt: DMatrix<f64>,
}

impl Decomposition {
    /// Creates a decomposition after checking that the mode axis agrees.
    ///
    /// Descending order of `s` is the caller's responsibility; an unsorted
    /// vector is accepted with a warning.
    pub fn new(u: DMatrix<f64>, s: DVector<f64>, vt: DMatrix<f64>) -> HindcastResult<Self> {
        let k = s.len();
        if u.ncols() != k {
            return Err(HindcastError::mismatch("U columns (modes)", k, u.ncols()));
        }
        if vt.nrows() != k {
            return Err(HindcastError::mismatch("VT rows (modes)", k, vt.nrows()));
        }
        if s.iter().zip(s.iter().skip(1)).any(|(a, b)| b > a) {
            warn!("Singular values are not sorted in descending order");
        }
        Ok(Self { u, s, vt })
    }

    /// Number of modes `k`
    pub fn n_modes(&self) -> usize {
        self.s.len()
    }

    pub fn n_space(&self) -> usize {
        self.u.nrows()
    }

    pub fn n_time(&self) -> usize {
        self.vt.ncols()
    }

    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }

    pub fn singular_values(&self) -> &DVector<f64> {
        &self.s
    }

    pub fn vt(&self) -> &DMatrix<f64> {
        &self.vt
    }

    /// Checks `1 ≤ p ≤ k`.
    pub fn check_modes(&self, p: usize) -> HindcastResult<()> {
        if p < 1 || p > self.n_modes() {
            return Err(HindcastError::invalid(
                "p",
                p,
                format!("must be between 1 and {} (number of modes)", self.n_modes()),
            ));
        }
        Ok(())
    }

    /// Principal components `diag(S[:p]) · VT[:p, :]`, shape `p × n_time`.
    pub fn principal_components(&self, p: usize) -> HindcastResult<DMatrix<f64>> {
        self.check_modes(p)?;
        let mut pcs = self.vt.rows(0, p).into_owned();
        for (mut row, sigma) in pcs.row_iter_mut().zip(self.s.iter()) {
            row *= *sigma;
        }
        Ok(pcs)
    }

    /// Reorders modes consistently across `U`, `S` and `VT`.
    ///
    /// `order[i]` names the current mode that becomes mode `i`.
    pub fn permute_modes(&self, order: &[usize]) -> HindcastResult<Self> {
        let k = self.n_modes();
        if order.len() != k {
            return Err(HindcastError::mismatch("mode permutation length", k, order.len()));
        }
        let mut seen = vec![false; k];
        for &i in order {
            if i >= k || seen[i] {
                return Err(HindcastError::invalid(
                    "mode permutation",
                    format!("{:?}", order),
                    format!("must contain each index in 0..{} exactly once", k),
                ));
            }
            seen[i] = true;
        }

        let u = self.u.select_columns(order);
        let s = self.s.select_rows(order);
        let vt = self.vt.select_rows(order);
        Ok(Self { u, s, vt })
    }

    /// Rebuilds `U[:, :p] · diag(S[:p]) · VT[:p, :]`.
    pub fn reconstruct(&self, p: usize) -> HindcastResult<DMatrix<f64>> {
        let pcs = self.principal_components(p)?;
        Ok(self.u.columns(0, p) * pcs)
    }
}
