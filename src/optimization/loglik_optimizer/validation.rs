//! Validation helpers for log-likelihood optimization.
//!
//! Each helper checks one invariant and reports the first violation as a
//! specific [`OptError`] variant:
//!
//! - [`verify_tol_grad`], [`verify_tol_cost`]: optional tolerances are finite
//!   and strictly positive.
//! - [`validate_grad`]: gradient length and finiteness.
//! - [`validate_theta_hat`]: the solver produced a finite estimate.
//! - [`validate_value`]: a log-likelihood value is finite.
//! - [`validate_hessian`]: Hessian shape and finiteness.
//! - [`validate_theta_input`]: a starting point is finite and correctly sized.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Errors
/// ------
/// - [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector, rejecting missing or
/// non-finite estimates.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta)
}

pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Errors
/// ------
/// - [`OptError::HessianDimMismatch`] if the matrix is not `dim × dim`.
/// - [`OptError::InvalidHessian`] for the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((row, col), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row, col, value });
        }
    }
    Ok(())
}

/// Check a starting point against the expected number of free parameters.
pub fn validate_theta_input(theta: &Theta, expected: usize) -> OptResult<()> {
    if theta.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    match theta.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    #[test]
    // Purpose
    // -------
    // The first offending element is reported for gradients and inputs.
    //
    // Given
    // -----
    // - Vectors with a NaN in position 1 and a wrongly sized vector.
    //
    // Expect
    // ------
    // - Index 1 is reported; size mismatch is reported as such.
    fn first_offending_entry_is_reported() {
        // Arrange
        let bad = array![0.0, f64::NAN, f64::INFINITY];

        // Act / Assert
        assert!(matches!(validate_grad(&bad, 3), Err(OptError::InvalidGradient { index: 1, .. })));
        assert!(matches!(
            validate_theta_input(&bad, 3),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
        assert_eq!(
            validate_theta_input(&bad, 2),
            Err(OptError::ThetaLengthMismatch { expected: 2, actual: 3 })
        );
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
    }

    #[test]
    // Purpose
    // -------
    // Hessian validation checks shape before contents.
    //
    // Given
    // -----
    // - A 2×3 matrix and a 2×2 matrix holding an infinity.
    //
    // Expect
    // ------
    // - `HessianDimMismatch`, then `InvalidHessian` at the infinite entry.
    fn hessian_validation_checks_shape_then_entries() {
        // Arrange
        let wide = Array2::<f64>::zeros((2, 3));
        let mut square = Array2::<f64>::zeros((2, 2));
        square[[1, 0]] = f64::INFINITY;

        // Act / Assert
        assert!(matches!(validate_hessian(&wide, 2), Err(OptError::HessianDimMismatch { .. })));
        assert!(matches!(
            validate_hessian(&square, 2),
            Err(OptError::InvalidHessian { row: 1, col: 0, .. })
        ));
    }
}
