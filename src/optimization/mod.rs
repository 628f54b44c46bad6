//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Fit spectral models by maximum likelihood. Combines an Argmin-backed
//! log-likelihood optimizer, positivity-preserving parameter transforms and
//! one error/result surface shared by every caller.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: maximize `ℓ(θ)` with L-BFGS and a selectable line
//!   search; finite-difference gradients and Hessians on demand.
//! - `numerical_stability`: softplus mappings between unconstrained `θ` and
//!   positive normalizations.
//! - `errors`: configuration mistakes, numerical failures and Argmin errors
//!   normalized into [`errors::OptError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers work in unconstrained space and report invalid states as
//!   `OptError`, never panics.
//! - User-facing values are log-likelihoods `ℓ`, not costs.
//!
//! Downstream usage
//! ----------------
//! - The Poisson backend implements `LogLikelihood` and calls `maximize`.
//! - The upper-limit and significance solvers reuse `OptError` for their
//!   own Argmin runs.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
