//! inference::hessian — observed-information covariance and standard errors.
//!
//! Purpose
//! -------
//! Turn a finite-difference Hessian of the negative log-likelihood at the
//! best fit into a parameter covariance, and push that covariance through a
//! Jacobian to obtain the uncertainty of a derived quantity such as an
//! integrated photon flux.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`]: Moore–Penrose pseudoinverse of the observed
//!   information `J(θ̂)` via symmetric eigendecomposition.
//! - [`calc_standard_errors`]: square roots of the covariance diagonal.
//! - [`delta_method_variance`]: `Var(g(θ̂)) ≈ ∇gᵀ Σ ∇g`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient map passed in is the gradient of `-ℓ`, so `J(θ̂)` is
//!   positive semi-definite near a maximum.
//! - Eigenvalues at most [`EIGEN_EPS`] are dropped; weakly constrained
//!   directions therefore contribute nothing rather than blowing up.
//!
//! Conventions
//! -----------
//! - Everything is expressed in unconstrained optimizer space `θ`; callers
//!   supply the Jacobian of the physical quantity with respect to `θ`.
//! - No explicit inverse is formed.
//!
//! Downstream usage
//! ----------------
//! - The Poisson backend calls [`calc_covariance`] after each fit and
//!   [`delta_method_variance`] to report `flux_err`.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::finite_diff::compute_hessian,
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// calc_covariance — pseudoinverse of the observed information matrix.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient map of the negative log-likelihood, `θ ↦ -∇ℓ(θ)`.
/// - `theta_hat`: `&Array1<f64>`
///   Best-fit point.
///
/// Returns
/// -------
/// `OptResult<Array2<f64>>`
///   Symmetric `n × n` covariance `J⁺`.
///
/// Errors
/// ------
/// - Any error from [`compute_hessian`].
///
/// Notes
/// -----
/// - `J⁺ = Σ_{k: λ_k > EIGEN_EPS} q_k q_kᵀ / λ_k` where `J = Q Λ Qᵀ`.
pub fn calc_covariance<F: Fn(&Array1<f64>) -> Array1<f64>>(
    f: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array2<f64>> {
    let n = theta_hat.len();
    let obs_info = compute_hessian(f, theta_hat)?;
    let mut obs_info_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(&obs_info, &mut obs_info_nalg);
    Ok(pseudo_inverse(obs_info_nalg, n))
}

/// Classical standard errors, `sqrt(diag(J⁺))`.
///
/// Errors
/// ------
/// - Any error from [`compute_hessian`].
pub fn calc_standard_errors<F: Fn(&Array1<f64>) -> Array1<f64>>(
    f: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array1<f64>> {
    let cov = calc_covariance(f, theta_hat)?;
    Ok(cov.diag().mapv(|v| v.max(0.0).sqrt()))
}

/// delta_method_variance — variance of a scalar function of `θ̂`.
///
/// Parameters
/// ----------
/// - `cov`: `&Array2<f64>`
///   `n × n` covariance of `θ̂`.
/// - `jacobian`: `&Array1<f64>`
///   `∇g(θ̂)`, length `n`.
///
/// Errors
/// ------
/// - [`OptError::GradientDimMismatch`] when the Jacobian length does not
///   match the covariance dimension.
pub fn delta_method_variance(cov: &Array2<f64>, jacobian: &Array1<f64>) -> OptResult<f64> {
    if cov.nrows() != jacobian.len() || cov.ncols() != jacobian.len() {
        return Err(OptError::GradientDimMismatch { expected: cov.nrows(), found: jacobian.len() });
    }
    Ok(jacobian.dot(&cov.dot(jacobian)).max(0.0))
}

// ---- Helper methods ----

/// Copy an `ndarray` matrix into a preallocated `DMatrix`, column by column.
fn fill_dmatrix(obs_info: &Array2<f64>, obs_info_nalg: &mut DMatrix<f64>) {
    let n = obs_info.ncols();
    for j in 0..n {
        for i in 0..obs_info.nrows() {
            obs_info_nalg[(i, j)] = obs_info[[i, j]];
        }
    }
}

fn pseudo_inverse(obs_info_nalg: DMatrix<f64>, n: usize) -> Array2<f64> {
    let eigen_decomp = obs_info_nalg.symmetric_eigen();
    let q = eigen_decomp.eigenvectors;
    let mut cov = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen_decomp.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            let coeff = q[(i, k)] / lambda;
            for j in 0..n {
                cov[[i, j]] += coeff * q[(j, k)];
            }
        }
    }
    cov
}
