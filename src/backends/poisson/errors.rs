//! backends::poisson::errors — malformed inputs to the Poisson backend.
use crate::{binning::BinningError, fitting::FitError};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type PoissonResult<T> = Result<T, PoissonError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PoissonError {
    // ---- Events ----
    EventLengthMismatch { times: usize, energies: usize },
    NonFiniteEvent { index: usize, time: f64, energy: f64 },
    NonPositiveEnergy { index: usize, energy: f64 },

    // ---- Energy binning ----
    TooFewEdges { found: usize },
    NonIncreasingEdges { index: usize },
    InvalidEnergyRange { emin: f64, emax: f64 },

    // ---- Model ----
    InvalidEffectiveArea { value: f64 },
    InvalidScale { source: String, value: f64 },
    DuplicateSource { name: String },
    NoComponents,

    // ---- Wrapped ----
    Binning(BinningError),
    Io { text: String },
}

impl std::error::Error for PoissonError {}

impl std::fmt::Display for PoissonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoissonError::EventLengthMismatch { times, energies } => {
                write!(f, "Event list has {times} times but {energies} energies")
            }
            PoissonError::NonFiniteEvent { index, time, energy } => {
                write!(f, "Event {index} is not finite: time {time}, energy {energy}")
            }
            PoissonError::NonPositiveEnergy { index, energy } => {
                write!(f, "Event {index} has non-positive energy {energy}")
            }
            PoissonError::TooFewEdges { found } => {
                write!(f, "Energy binning needs at least 2 edges, found {found}")
            }
            PoissonError::NonIncreasingEdges { index } => {
                write!(f, "Energy edges must be positive and strictly increasing (edge {index})")
            }
            PoissonError::InvalidEnergyRange { emin, emax } => {
                write!(f, "Invalid energy range [{emin}, {emax}]: need 0 < emin < emax")
            }
            PoissonError::InvalidEffectiveArea { value } => {
                write!(f, "Effective area must be finite and positive, got {value}")
            }
            PoissonError::InvalidScale { source, value } => {
                write!(f, "Pivot energy of '{source}' must be finite and positive, got {value}")
            }
            PoissonError::DuplicateSource { name } => {
                write!(f, "Source '{name}' is defined more than once")
            }
            PoissonError::NoComponents => write!(f, "Model has no components"),
            PoissonError::Binning(err) => write!(f, "{err}"),
            PoissonError::Io { text } => write!(f, "I/O error: {text}"),
        }
    }
}

impl From<BinningError> for PoissonError {
    fn from(err: BinningError) -> Self {
        PoissonError::Binning(err)
    }
}

impl From<std::io::Error> for PoissonError {
    fn from(err: std::io::Error) -> Self {
        PoissonError::Io { text: err.to_string() }
    }
}

impl From<serde_json::Error> for PoissonError {
    fn from(err: serde_json::Error) -> Self {
        PoissonError::Io { text: err.to_string() }
    }
}

impl From<PoissonError> for FitError {
    fn from(err: PoissonError) -> Self {
        FitError::Backend { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<PoissonError> for PyErr {
    fn from(err: PoissonError) -> PyErr {
        PyValueError::new_err(format!("PoissonError: {err}"))
    }
}
