//! Numerical stability utilities.
//!
//! Guarded versions of the transforms used to keep spectral normalizations
//! strictly positive while the optimizer works in unconstrained space.
//! A cutoff of `x > 20.0` keeps `f64` arithmetic well conditioned.
//!
//! # Provided items
//! - [`EIGEN_EPS`]: floor for Hessian diagonals before inversion.
//! - [`safe_softplus(x)`]: `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
//! - [`safe_softplus_inv(x)`]: inverse of softplus on (0, ∞).
//! - [`safe_logistic(x)`]: `1 / (1 + exp(-x))`, the softplus derivative.

/// Smallest curvature treated as informative when inverting a Hessian.
pub const EIGEN_EPS: f64 = 1e-12;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// For `x > 20` the result is `x` to within `f64` precision; otherwise
/// `ln1p(exp(x))` keeps precision for large negative `x`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: returns `t = ln(exp(x) - 1)`.
///
/// # Parameters
/// - `x`: a positive real (the softplus output), must be finite and `> 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Logistic function, `d softplus(x) / dx`.
///
/// Evaluated through `exp(-|x|)` so neither tail overflows.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
