//! loglik_optimizer — Argmin-powered log-likelihood maximization.
//!
//! Purpose
//! -------
//! Maximize spectral log-likelihoods `ℓ(θ)` for the reference analysis
//! backend. Callers implement [`LogLikelihood`] and invoke [`maximize`] to
//! run L-BFGS with a configurable line search, tolerances and
//! finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the Argmin cost
//!   `c(θ) = -ℓ(θ)`.
//! - [`maximize`] validates the start with [`LogLikelihood::check`], picks
//!   a solver from [`builders`], runs it via [`run::run_lbfgs`] and
//!   normalizes the result into an [`OptimOutcome`].
//! - [`finite_diff`] supplies gradients and Hessians when analytic
//!   derivatives are missing; the Hessian also feeds flux uncertainties.
//!
//! Invariants & assumptions
//! ------------------------
//! - Likelihoods implement `ℓ(θ)` and `∇ℓ(θ)`, never the cost.
//! - Invalid inputs are reported as [`OptError`] values, not panics.
//! - [`OptimOutcome::converged`] is true only for `SolverConverged`.
//!
//! Conventions
//! -----------
//! - Parameters live in unconstrained space as [`Theta`]; mapping to
//!   physical parameters (positive normalizations) happens in the model
//!   layer.
//! - Diagnostics, including [`OptimOutcome::value`], are in terms of `ℓ`.
//!
//! Testing notes
//! -------------
//! - Submodule unit tests cover sign conventions, solver construction,
//!   finite differences, validation and configuration invariants.
//! - The Poisson backend tests exercise [`maximize`] on real spectra.
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
