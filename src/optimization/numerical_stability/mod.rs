//! numerical_stability — guarded transforms for positive parameters.
//!
//! Purpose
//! -------
//! Map unconstrained optimizer coordinates onto strictly positive spectral
//! normalizations and back, and share the small tolerance used when
//! inverting curvature matrices.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite `f64`; domain checks happen in the model layer.
//! - `safe_softplus_inv` is only called on strictly positive values.
//!
//! Conventions
//! -----------
//! - Pure functions, no logging or I/O; safe inside likelihood inner loops.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{EIGEN_EPS, safe_logistic, safe_softplus, safe_softplus_inv};

pub mod prelude {
    pub use super::transformations::{EIGEN_EPS, safe_logistic, safe_softplus, safe_softplus_inv};
}
