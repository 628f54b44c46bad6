//! statistics::errors — error surface for TS_var aggregation and calibration.
//!
//! Purpose
//! -------
//! Report invalid inputs to the variability aggregator and the
//! significance calibrator as [`StatError`], with the alias
//! [`StatResult`].
//!
//! Conventions
//! -----------
//! - Numeric indeterminacy inside the aggregator (a NaN damping weight) is
//!   recovered locally and never becomes an error.
//! - An unresolvable significance is reported through
//!   `SigmaOutcome::converged`, not through this enum; only invalid inputs
//!   and solver failures land here.
use crate::optimization::errors::OptError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type StatResult<T> = Result<T, StatError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StatError {
    /// No per-bin results were supplied.
    NoBins,

    /// Systematic fraction must be finite and non-negative.
    InvalidSystematicFraction { value: f64 },

    /// The χ² reference distribution needs at least one degree of freedom.
    InsufficientBins { nbins: usize },

    NonFiniteTsVar { value: f64 },

    /// `statrs` rejected a distribution parameter.
    Distribution { text: String },

    /// The calibrator's minimizer failed.
    Optimizer(OptError),
}

impl std::error::Error for StatError {}

impl std::fmt::Display for StatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatError::NoBins => write!(f, "No time bins to aggregate"),
            StatError::InvalidSystematicFraction { value } => {
                write!(f, "Invalid systematic fraction {value}: must be finite and non-negative")
            }
            StatError::InsufficientBins { nbins } => {
                write!(f, "Need at least 2 time bins to calibrate significance, got {nbins}")
            }
            StatError::NonFiniteTsVar { value } => write!(f, "TS_var must be finite, got {value}"),
            StatError::Distribution { text } => write!(f, "Distribution error: {text}"),
            StatError::Optimizer(err) => write!(f, "Significance solver failed: {err}"),
        }
    }
}

impl From<OptError> for StatError {
    fn from(err: OptError) -> Self {
        StatError::Optimizer(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<StatError> for PyErr {
    fn from(err: StatError) -> PyErr {
        PyValueError::new_err(format!("StatError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Display messages carry the offending payload.
    //
    // Given
    // -----
    // - `InsufficientBins { nbins: 1 }` and `InvalidSystematicFraction`.
    //
    // Expect
    // ------
    // - The payload values appear in the rendered message.
    fn display_embeds_payload() {
        // Arrange
        let bins = StatError::InsufficientBins { nbins: 1 };
        let frac = StatError::InvalidSystematicFraction { value: -0.5 };

        // Act / Assert
        assert!(bins.to_string().contains("got 1"));
        assert!(frac.to_string().contains("-0.5"));
    }
}
