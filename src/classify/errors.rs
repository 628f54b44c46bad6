//! classify::errors — invalid inputs to source classification.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type ClassifyResult<T> = Result<T, ClassifyError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// A likelihood summary field is NaN or infinite.
    NonFiniteTs { field: &'static str, value: f64 },
    UnknownSpectralModel { name: String },
    /// Point and extended hypotheses were fitted with different spectra.
    SpectralMismatch { point: String, extended: String },
    Serialization { text: String },
}

impl std::error::Error for ClassifyError {}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifyError::NonFiniteTs { field, value } => {
                write!(f, "Non-finite {field} = {value}")
            }
            ClassifyError::UnknownSpectralModel { name } => {
                write!(f, "Unknown spectral model '{name}'")
            }
            ClassifyError::SpectralMismatch { point, extended } => write!(
                f,
                "Point ({point}) and extended ({extended}) fits use different spectral models"
            ),
            ClassifyError::Serialization { text } => {
                write!(f, "Invalid classification table: {text}")
            }
        }
    }
}

impl From<serde_json::Error> for ClassifyError {
    fn from(err: serde_json::Error) -> Self {
        ClassifyError::Serialization { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ClassifyError> for PyErr {
    fn from(err: ClassifyError) -> PyErr {
        PyValueError::new_err(format!("ClassifyError: {err}"))
    }
}
