//! pipeline::errors — run-level failures of a variability test.
//!
//! Purpose
//! -------
//! Wrap the subtree errors ([`BinningError`], [`FitError`], [`StatError`])
//! with the context the driver knows: which backend and which band failed.
//! Workspace and output I/O problems are reported here as well.
//!
//! Conventions
//! -----------
//! - Any per-bin failure aborts the run; the error carries the zero-based
//!   band index and the backend label.
//! - I/O errors are flattened to text so the enum stays `Clone + PartialEq`
//!   like the rest of the crate's error types.
use crate::{binning::BinningError, fitting::FitError, statistics::StatError};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};
use std::path::Path;

pub type VariabilityResult<T> = Result<T, VariabilityError>;

#[derive(Debug, Clone, PartialEq)]
pub enum VariabilityError {
    // ---- Configuration ----
    Binning(BinningError),
    Config(FitError),
    InvalidOption { key: &'static str, reason: String },
    NoBackends,
    DuplicateBackend { label: String },

    // ---- Fitting ----
    AllTimeFit { backend: String, source: FitError },
    BinFit { band: usize, backend: String, source: FitError },

    // ---- Statistics ----
    Statistics { backend: String, source: StatError },

    // ---- Collaborators / I/O ----
    Provider { backend: String, text: String },
    Io { path: String, text: String },
    Serialization { text: String },
}

impl VariabilityError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        VariabilityError::Io { path: path.display().to_string(), text: err.to_string() }
    }
}

impl std::error::Error for VariabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VariabilityError::Binning(err) => Some(err),
            VariabilityError::Config(err)
            | VariabilityError::AllTimeFit { source: err, .. }
            | VariabilityError::BinFit { source: err, .. } => Some(err),
            VariabilityError::Statistics { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for VariabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariabilityError::Binning(err) => write!(f, "Invalid time binning: {err}"),
            VariabilityError::Config(err) => write!(f, "Invalid configuration: {err}"),
            VariabilityError::InvalidOption { key, reason } => {
                write!(f, "Invalid option '{key}': {reason}")
            }
            VariabilityError::NoBackends => write!(f, "At least one backend is required"),
            VariabilityError::DuplicateBackend { label } => {
                write!(f, "Backend label '{label}' is used more than once")
            }
            VariabilityError::AllTimeFit { backend, source } => {
                write!(f, "All-time fit with backend '{backend}' failed: {source}")
            }
            VariabilityError::BinFit { band, backend, source } => {
                write!(f, "Fit of band {band} with backend '{backend}' failed: {source}")
            }
            VariabilityError::Statistics { backend, source } => {
                write!(f, "Variability statistic for backend '{backend}' failed: {source}")
            }
            VariabilityError::Provider { backend, text } => {
                write!(f, "Backend provider '{backend}' failed: {text}")
            }
            VariabilityError::Io { path, text } => write!(f, "I/O error at '{path}': {text}"),
            VariabilityError::Serialization { text } => write!(f, "Serialization error: {text}"),
        }
    }
}

impl From<BinningError> for VariabilityError {
    fn from(err: BinningError) -> Self {
        VariabilityError::Binning(err)
    }
}

impl From<FitError> for VariabilityError {
    fn from(err: FitError) -> Self {
        VariabilityError::Config(err)
    }
}

impl From<serde_json::Error> for VariabilityError {
    fn from(err: serde_json::Error) -> Self {
        VariabilityError::Serialization { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<VariabilityError> for PyErr {
    fn from(err: VariabilityError) -> PyErr {
        PyValueError::new_err(format!("VariabilityError: {err}"))
    }
}
