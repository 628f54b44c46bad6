//! rust_variability — likelihood-based flux variability testing for
//! astrophysical sources, with optional Python bindings.
//!
//! Purpose
//! -------
//! Decide whether a source's flux changed over an observation: split the
//! observation into time bins, refit the source in each bin against a
//! maximum-likelihood analysis engine, combine the per-bin likelihood
//! ratios into the damped statistic TS_var, and express TS_var as a
//! two-sided Gaussian significance. The crate root also hosts the PyO3
//! bridge (`_rust_variability`) when `python-bindings` is enabled.
//!
//! Key behaviors
//! -------------
//! - [`binning`]: uniform or explicit time bins over the observed span.
//! - [`fitting`]: the engine contract and the two-stage per-bin fit,
//!   including upper limits.
//! - [`statistics`]: TS_var aggregation and sigma calibration.
//! - [`pipeline`]: the multi-backend driver, per-bin workspaces and the
//!   persisted results layout.
//! - [`classify`]: automatic and manual catalog classification.
//! - [`backends`]: a reference binned-Poisson engine.
//! - [`optimization`] / [`inference`]: the L-BFGS likelihood maximizer and
//!   observed-information covariances used by the reference engine.
//!
//! Invariants & assumptions
//! ------------------------
//! - Numerical modules never print; progress goes through the `log`
//!   facade and no logger is installed by the library.
//! - Every module reports failures through its own error enum; the driver
//!   wraps them in `pipeline::VariabilityError`.
//!
//! Downstream usage
//! ----------------
//! - Instrument toolchains implement `fitting::AnalysisBackend` and
//!   `pipeline::BackendProvider`, then call
//!   `pipeline::VariabilityTester::run`.
//! - Python callers use `_rust_variability.statistics` for TS_var and
//!   sigma on precomputed per-bin results, and
//!   `_rust_variability.classify` for the automatic classification rules.

pub mod backends;
pub mod binning;
pub mod classify;
pub mod fitting;
pub mod inference;
pub mod optimization;
pub mod pipeline;
pub mod statistics;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    classify::{LikelihoodSummary, classify_automatic},
    statistics::{
        BinContribution, SigmaOutcome, SignificanceCalibrator, StatError, VariabilityAggregator,
        sum_contributions,
    },
    utils::{extract_column, extract_spectral_model, require_same_length},
};

/// VariabilityStatistic — TS_var and its significance for Python callers.
///
/// Purpose
/// -------
/// Hold the per-bin breakdown and the calibrated sigma computed by
/// [`compute_ts_var`] from already fitted per-bin likelihoods and fluxes.
///
/// Fields
/// ------
/// - `contributions`: one [`BinContribution`] per bin, in input order.
/// - `ts_var`: sum of the contributions.
/// - `significance`: [`SigmaOutcome`] for `nbins − 1` degrees of freedom.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_variability.statistics")]
pub struct VariabilityStatistic {
    contributions: Vec<BinContribution>,
    ts_var: f64,
    significance: SigmaOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl VariabilityStatistic {
    #[getter]
    pub fn ts_var(&self) -> f64 {
        self.ts_var
    }

    #[getter]
    pub fn sigma(&self) -> f64 {
        self.significance.sigma
    }

    /// Whether the sigma search met its residual tolerance.
    #[getter]
    pub fn converged(&self) -> bool {
        self.significance.converged
    }

    #[getter]
    pub fn nbins(&self) -> usize {
        self.contributions.len()
    }

    #[getter]
    pub fn weights(&self) -> Vec<f64> {
        self.contributions.iter().map(|c| c.weight).collect()
    }

    #[getter]
    pub fn contributions(&self) -> Vec<f64> {
        self.contributions.iter().map(|c| c.contribution).collect()
    }

    /// Bins whose NaN damping weight was replaced by 1.
    #[getter]
    pub fn weight_substituted(&self) -> Vec<bool> {
        self.contributions.iter().map(|c| c.weight_substituted).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "VariabilityStatistic(ts_var={:.4}, sigma={:.4}, nbins={})",
            self.ts_var,
            self.significance.sigma,
            self.contributions.len()
        )
    }
}

/// compute_ts_var — TS_var and sigma from per-bin fit results.
///
/// Parameters
/// ----------
/// - `ll_frozen`, `ll_free`: per-bin log-likelihoods with the source
///   frozen at its all-time state and with its normalization refit.
/// - `fluxes`: per-bin best-fit fluxes.
/// - `all_time_flux`: reference flux `F0` of the all-time fit.
/// - `systematic_fraction`: damping fraction; defaults to 0.02.
///
/// Errors
/// ------
/// - `ValueError` for unequal column lengths, fewer than two bins, an
///   invalid systematic fraction, or a non-finite TS_var.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (ll_frozen, ll_free, fluxes, all_time_flux, systematic_fraction = 0.02),
    text_signature = "(ll_frozen, ll_free, fluxes, all_time_flux, /, systematic_fraction=0.02)"
)]
pub fn compute_ts_var<'py>(
    ll_frozen: &Bound<'py, PyAny>, ll_free: &Bound<'py, PyAny>, fluxes: &Bound<'py, PyAny>,
    all_time_flux: f64, systematic_fraction: f64,
) -> PyResult<VariabilityStatistic> {
    let ll_frozen = extract_column(ll_frozen, "ll_frozen")?;
    let ll_free = extract_column(ll_free, "ll_free")?;
    let fluxes = extract_column(fluxes, "fluxes")?;
    let nbins = require_same_length(&[
        ("ll_frozen", ll_frozen.as_slice()),
        ("ll_free", ll_free.as_slice()),
        ("fluxes", fluxes.as_slice()),
    ])?;
    if nbins == 0 {
        return Err(StatError::NoBins.into());
    }

    let aggregator = VariabilityAggregator::new(systematic_fraction)?;
    let contributions: Vec<BinContribution> = ll_frozen
        .iter()
        .zip(ll_free.iter())
        .zip(fluxes.iter())
        .map(|((&frozen, &free), &flux)| {
            aggregator.contribution_from(2.0 * (free - frozen), flux, all_time_flux)
        })
        .collect();
    let ts_var = sum_contributions(&contributions);
    let significance = SignificanceCalibrator::default().calibrate(ts_var, nbins)?;
    Ok(VariabilityStatistic { contributions, ts_var, significance })
}

/// ts_var_to_sigma — two-sided Gaussian sigma of a TS_var over `nbins`
/// bins.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(text_signature = "(ts_var, nbins, /)")]
pub fn ts_var_to_sigma(ts_var: f64, nbins: usize) -> PyResult<f64> {
    Ok(statistics::ts_var_to_sigma(ts_var, nbins)?)
}

/// classify_source — automatic catalog classification.
///
/// Returns
/// -------
/// `(source_class, spatial_model, spectral_model, abbreviation)` as
/// catalog strings, e.g. `("Pulsar", "Point", "PLSuperExpCutoff", "M")`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (ts_point, ts_extended, ts_cutoff = None, spectral_model = None),
    text_signature = "(ts_point, ts_extended, /, ts_cutoff=None, spectral_model='PowerLaw')"
)]
pub fn classify_source(
    ts_point: f64, ts_extended: f64, ts_cutoff: Option<f64>, spectral_model: Option<&str>,
) -> PyResult<(String, String, String, String)> {
    let spectral = extract_spectral_model(spectral_model)?;
    let summary = LikelihoodSummary::new(ts_point, ts_extended, ts_cutoff, spectral)?;
    let c = classify_automatic(&summary);
    Ok((
        c.source_class.to_string(),
        c.spatial_model.to_string(),
        c.spectral_model.to_string(),
        c.source_class.abbreviation().to_string(),
    ))
}

/// `_rust_variability` — extension module initializer.
///
/// Registers the `statistics` and `classify` submodules and inserts them
/// into `sys.modules` so that `rust_variability.statistics` style imports
/// work.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_variability<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let statistics_mod = PyModule::new(_py, "statistics")?;
    let classify_mod = PyModule::new(_py, "classify")?;
    statistics_module(m, &statistics_mod)?;
    classify_module(m, &classify_mod)?;

    let modules = _py.import("sys")?.getattr("modules")?;
    modules.set_item("rust_variability.statistics", statistics_mod)?;
    modules.set_item("rust_variability.classify", classify_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistics_module<'py>(
    rust_variability: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<VariabilityStatistic>()?;
    m.add_function(wrap_pyfunction!(compute_ts_var, m)?)?;
    m.add_function(wrap_pyfunction!(ts_var_to_sigma, m)?)?;
    rust_variability.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn classify_module<'py>(
    rust_variability: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(classify_source, m)?)?;
    rust_variability.add_submodule(m)?;
    Ok(())
}
