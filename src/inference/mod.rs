//! inference — parameter uncertainty for fitted spectral models.
//!
//! Purpose
//! -------
//! Post-fit uncertainty quantification in unconstrained optimizer space:
//! observed-information covariance, classical standard errors, and
//! delta-method propagation onto derived quantities such as the integrated
//! flux of a source.
//!
//! Conventions
//! -----------
//! - Failures surface as `OptError`; nothing here logs or performs I/O.
//!
//! Downstream usage
//! ----------------
//! - `backends::poisson` derives `flux_err` with [`calc_covariance`] and
//!   [`delta_method_variance`].

pub mod hessian;

pub use self::hessian::{calc_covariance, calc_standard_errors, delta_method_variance};

pub mod prelude {
    pub use super::hessian::{calc_covariance, calc_standard_errors, delta_method_variance};
}
