//! utils — conversion helpers for the PyO3 layer.
//!
//! Everything here is compiled only with `python-bindings` and turns
//! loosely typed Python inputs into validated Rust values.

#[cfg(feature = "python-bindings")]
use numpy::PyReadonlyArray1;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::classify::SpectralModel;

/// Read a 1-D float column from an ndarray, a pandas Series, or any
/// sequence of floats.
///
/// Errors
/// ------
/// - `TypeError` naming `name` when the object cannot be read as floats.
#[cfg(feature = "python-bindings")]
pub fn extract_column(raw: &Bound<'_, PyAny>, name: &str) -> PyResult<Vec<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_vec());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(series) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(series.as_array().to_vec());
        }
    }
    raw.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{name}: expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64"
        ))
    })
}

/// Check that per-bin columns have one entry per bin.
///
/// Errors
/// ------
/// - `ValueError` listing the offending lengths.
#[cfg(feature = "python-bindings")]
pub fn require_same_length(columns: &[(&str, &[f64])]) -> PyResult<usize> {
    let n = columns.first().map_or(0, |(_, c)| c.len());
    if columns.iter().any(|(_, c)| c.len() != n) {
        let lens: Vec<String> =
            columns.iter().map(|(name, c)| format!("{name}={}", c.len())).collect();
        return Err(PyValueError::new_err(format!(
            "per-bin columns must have equal lengths ({})",
            lens.join(", ")
        )));
    }
    Ok(n)
}

/// Parse a spectral model name, defaulting to `PowerLaw`.
#[cfg(feature = "python-bindings")]
pub fn extract_spectral_model(name: Option<&str>) -> PyResult<SpectralModel> {
    Ok(name.unwrap_or("PowerLaw").parse::<SpectralModel>()?)
}
