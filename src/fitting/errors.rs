//! fitting::errors — configuration and convergence failures of per-bin fits.
//!
//! Purpose
//! -------
//! One enum, [`FitError`], for everything that can go wrong while driving
//! an analysis backend through the all-time and per-bin fitting protocol:
//! invalid fitter configuration (fatal before any fit), unknown sources or
//! parameters, exhausted retry budgets, and numerical failures bubbling up
//! from the likelihood optimizer.
//!
//! Conventions
//! -----------
//! - Configuration variants are raised by validation before the backend is
//!   touched.
//! - Optimizer failures keep their [`OptError`] payload.
use crate::optimization::errors::OptError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type FitResult<T> = Result<T, FitError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Configuration ----
    UnknownSource { name: String },
    /// The source of interest is registered as a background component.
    ConflictingRoles { name: String },
    UnknownParameter { source: String, parameter: String },
    InvalidMaxAttempts,
    InvalidMinTs { value: f64 },
    /// Upper-limit confidence must lie in (0.5, 1).
    InvalidConfidence { value: f64 },

    // ---- Fit outcome ----
    /// Every retry ended without convergence.
    DidNotConverge { attempts: usize, status: String },
    NonFiniteLikelihood { stage: &'static str, value: f64 },
    InvalidNormalization { source: String, value: f64 },
    /// No normalization reached the requested likelihood drop.
    UpperLimitBracket { source: String, upper: f64 },

    // ---- Wrapped ----
    Optimizer(OptError),
    Backend { text: String },
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::UnknownSource { name } => write!(f, "Unknown source '{name}'"),
            FitError::ConflictingRoles { name } => {
                write!(f, "Source of interest '{name}' is registered as a background source")
            }
            FitError::UnknownParameter { source, parameter } => {
                write!(f, "Source '{source}' has no parameter '{parameter}'")
            }
            FitError::InvalidMaxAttempts => write!(f, "Fit attempts must be at least 1"),
            FitError::InvalidMinTs { value } => {
                write!(f, "Invalid min_ts {value}: must be finite and non-negative")
            }
            FitError::InvalidConfidence { value } => {
                write!(f, "Invalid upper-limit confidence {value}: must lie in (0.5, 1)")
            }
            FitError::DidNotConverge { attempts, status } => {
                write!(f, "Fit did not converge after {attempts} attempt(s): {status}")
            }
            FitError::NonFiniteLikelihood { stage, value } => {
                write!(f, "Non-finite log-likelihood {value} after {stage}")
            }
            FitError::InvalidNormalization { source, value } => {
                write!(f, "Invalid normalization {value} for '{source}': must be finite and >= 0")
            }
            FitError::UpperLimitBracket { source, upper } => {
                write!(f, "Could not bracket the upper limit of '{source}' below {upper}")
            }
            FitError::Optimizer(err) => write!(f, "Optimizer error: {err}"),
            FitError::Backend { text } => write!(f, "Backend error: {text}"),
        }
    }
}

impl From<OptError> for FitError {
    fn from(err: OptError) -> Self {
        FitError::Optimizer(err)
    }
}

impl FitError {
    /// Whether this error describes the setup rather than a fit outcome.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FitError::UnknownSource { .. }
                | FitError::ConflictingRoles { .. }
                | FitError::InvalidMaxAttempts
                | FitError::InvalidMinTs { .. }
                | FitError::InvalidConfidence { .. }
        )
    }

    /// Recover a `FitError` that travelled through an Argmin run, or wrap
    /// whatever else Argmin reported.
    pub fn from_argmin(err: argmin::core::Error) -> Self {
        match err.downcast::<FitError>() {
            Ok(fit_err) => fit_err,
            Err(other) => FitError::Optimizer(OptError::from(other)),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<FitError> for PyErr {
    fn from(err: FitError) -> PyErr {
        PyValueError::new_err(format!("FitError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::ArgminError;

    #[test]
    // Purpose
    // -------
    // `from_argmin` recovers fitter errors and wraps foreign ones.
    //
    // Given
    // -----
    // - A `FitError` and an `ArgminError` boxed as `argmin::core::Error`.
    //
    // Expect
    // ------
    // - The `FitError` comes back unchanged; the Argmin one is wrapped.
    fn from_argmin_recovers_or_wraps() {
        // Arrange
        let ours: argmin::core::Error = FitError::InvalidMaxAttempts.into();
        let theirs: argmin::core::Error =
            ArgminError::InvalidParameter { text: "x".to_string() }.into();

        // Act / Assert
        assert_eq!(FitError::from_argmin(ours), FitError::InvalidMaxAttempts);
        assert_eq!(
            FitError::from_argmin(theirs),
            FitError::Optimizer(OptError::InvalidParameter { text: "x".to_string() })
        );
    }
}
