//! Least-squares fitting and correlation scoring.
//!
//! The design matrices here are tall and thin (thousands of days by at most a
//! few dozen modes), so the fit goes through a thin SVD. Singular values below
//! `ε · max(m, n) · σ_max` are dropped, which gives the minimum-norm solution
//! when the design is rank deficient.

use crate::error::{HindcastError, HindcastResult};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Result of an ordinary least-squares fit
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub beta: DVector<f64>,
    /// Number of singular values kept by the cut-off
    pub rank: usize,
}

/// Solve `min ‖x·β − y‖₂` using SVD.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> HindcastResult<LeastSquaresFit> {
    if x.nrows() != y.len() {
        return Err(HindcastError::mismatch(
            "least-squares rows",
            x.nrows(),
            y.len(),
        ));
    }
    if x.ncols() == 0 {
        return Err(HindcastError::mismatch("least-squares columns", 1, 0));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(HindcastError::Solver(
            "design matrix or response contains non-finite values".to_string(),
        ));
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let cutoff = f64::EPSILON * x.nrows().max(x.ncols()) as f64 * sigma_max;
    let rank = svd.singular_values.iter().filter(|s| **s > cutoff).count();
    debug!(
        "SVD least squares: {}x{} design, rank {}, cutoff {:e}",
        x.nrows(),
        x.ncols(),
        rank,
        cutoff
    );

    let beta = svd
        .solve(y, cutoff)
        .map_err(|e| HindcastError::Solver(e.to_string()))?;
    if beta.iter().any(|v| !v.is_finite()) {
        return Err(HindcastError::Solver(
            "solution contains non-finite coefficients".to_string(),
        ));
    }

    Ok(LeastSquaresFit { beta, rank })
}

/// Pearson correlation coefficient between two equally long series.
///
/// Fails with `DegenerateInput` for fewer than two points or when either
/// series has zero variance. The result is clamped to `[-1, 1]`.
pub fn pearson(observed: &[f64], predicted: &[f64]) -> HindcastResult<f64> {
    if observed.len() != predicted.len() {
        return Err(HindcastError::mismatch(
            "correlation inputs",
            observed.len(),
            predicted.len(),
        ));
    }
    let n = observed.len();
    if n < 2 {
        return Err(HindcastError::DegenerateInput(format!(
            "correlation needs at least 2 points, got {}",
            n
        )));
    }

    let mean_obs = observed.iter().sum::<f64>() / n as f64;
    let mean_pred = predicted.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_obs = 0.0;
    let mut var_pred = 0.0;
    for (o, p) in observed.iter().zip(predicted.iter()) {
        let dobs = o - mean_obs;
        let dpred = p - mean_pred;
        cov += dobs * dpred;
        var_obs += dobs * dobs;
        var_pred += dpred * dpred;
    }

    if var_obs == 0.0 {
        return Err(HindcastError::DegenerateInput(
            "observed series is constant".to_string(),
        ));
    }
    if var_pred == 0.0 {
        return Err(HindcastError::DegenerateInput(
            "predicted series is constant".to_string(),
        ));
    }

    let r = cov / (var_obs.sqrt() * var_pred.sqrt());
    if !r.is_finite() {
        return Err(HindcastError::DegenerateInput(
            "correlation is not finite".to_string(),
        ));
    }
    Ok(r.clamp(-1.0, 1.0))
}

/// Root mean square difference between two equally long series
pub fn rmse(observed: &[f64], predicted: &[f64]) -> HindcastResult<f64> {
    if observed.len() != predicted.len() {
        return Err(HindcastError::mismatch(
            "rmse inputs",
            observed.len(),
            predicted.len(),
        ));
    }
    if observed.is_empty() {
        return Err(HindcastError::DegenerateInput(
            "rmse needs at least 1 point".to_string(),
        ));
    }
    let mse = observed
        .iter()
        .zip(predicted.iter())
        .map(|(o, p)| (o - p).powi(2))
        .sum::<f64>()
        / observed.len() as f64;
    Ok(mse.sqrt())
}
