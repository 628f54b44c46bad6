//! loglik_optimizer::finite_diff — finite-difference derivatives with validation.
//!
//! Purpose
//! -------
//! Approximate gradients and Hessians when a likelihood has no analytic
//! derivative for the current parameter layout (e.g. a free photon index),
//! without exposing the `finitediff` API to the rest of the crate.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient; errors raised inside the
//!   objective are captured through a shared cell and surfaced afterwards.
//! - [`compute_hessian`]: central-difference Hessian of a gradient map, with
//!   a forward-difference fallback when the central result is not finite,
//!   symmetrized before it is returned.
//!
//! Invariants & assumptions
//! ------------------------
//! - Derivatives are taken in unconstrained `Theta` space.
//! - Every returned gradient/Hessian passes [`validate_grad`] /
//!   [`validate_hessian`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// run_fd_diff — forward-difference gradient with error capture.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point.
/// - `func`: `&G`
///   Objective closure. On failure it must store the error in
///   `closure_err` and return `NaN`.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Error side channel; cleared on entry.
///
/// Errors
/// ------
/// - The first error captured from `func`, mapped into `OptError`.
/// - [`validate_grad`] failures for the resulting gradient.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// compute_hessian — finite-difference Hessian of a gradient map.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient map `θ ↦ g(θ)`. Pass the gradient of the negative
///   log-likelihood to obtain the observed information matrix.
/// - `theta`: `&Theta`
///   Evaluation point.
///
/// Returns
/// -------
/// `OptResult<Hessian>`
///   Symmetric `n × n` matrix with finite entries.
///
/// Errors
/// ------
/// - [`validate_hessian`] failures of the forward-difference fallback.
///
/// Notes
/// -----
/// - The central-difference validation error is discarded; only the
///   fallback result is surfaced.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use argmin::core::ArgminError;
    use ndarray::{Array1, Array2};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradients with and without captured errors.
    // - Hessian construction, validation failures and symmetrization.
    //
    // They intentionally DO NOT cover:
    // - Solver runs (see the spectral backend tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A Poisson-like objective yields its analytic gradient.
    //
    // Given
    // -----
    // - f(θ) = n·ln(θ) − θ with n = 4, evaluated at θ = 2.
    //
    // Expect
    // ------
    // - Gradient ≈ n/θ − 1 = 1.
    fn run_fd_diff_matches_analytic_derivative() {
        // Arrange
        let theta: Theta = Array1::from(vec![2.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| 4.0 * x[0].ln() - x[0];

        // Act
        let grad = run_fd_diff(&theta, &f, &closure_err).unwrap();

        // Assert
        assert!((grad[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Errors raised inside the objective surface as `OptError`.
    //
    // Given
    // -----
    // - An objective that stores an `ArgminError` and returns NaN.
    //
    // Expect
    // ------
    // - `OptError::NotImplemented`.
    fn run_fd_diff_closure_error_is_propagated() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::NotImplemented { .. }));
    }

    #[test]
    // Purpose
    // -------
    // The Hessian of a linear gradient map is its matrix, symmetrized.
    //
    // Given
    // -----
    // - g(θ) = A θ with A = [[4, 1], [1, 2]].
    //
    // Expect
    // ------
    // - H ≈ A and H is exactly symmetric.
    fn compute_hessian_recovers_linear_map() {
        // Arrange
        let a = Array2::from_shape_vec((2, 2), vec![4.0, 1.0, 1.0, 2.0]).unwrap();
        let grad_fn = |theta: &Theta| a.dot(theta);
        let theta: Theta = Array1::from(vec![0.3_f64, -0.7]);

        // Act
        let hess = compute_hessian(&grad_fn, &theta).unwrap();

        // Assert
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
        for ((i, j), v) in hess.indexed_iter() {
            assert!((v - a[[i, j]]).abs() < 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Non-finite gradient maps produce `InvalidHessian`.
    //
    // Given
    // -----
    // - A gradient map returning NaN.
    //
    // Expect
    // ------
    // - `OptError::InvalidHessian`.
    fn compute_hessian_non_finite_entries_yield_error() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64]);
        let grad_fn = |_theta: &Theta| Array1::from(vec![f64::NAN]);

        // Act
        let err = compute_hessian(&grad_fn, &theta).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::InvalidHessian { .. }));
    }
}
