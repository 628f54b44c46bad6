//! fitting::backend — contract between the variability protocol and a
//! maximum-likelihood analysis engine.
//!
//! Purpose
//! -------
//! Describe, as an object-safe trait, the handful of operations the
//! per-bin protocol needs from a spectral analysis engine: fitting,
//! likelihood and TS queries, freezing and freeing sources, normalization
//! access, flux queries, and snapshot save/restore. Engines for specific
//! instruments implement [`AnalysisBackend`]; the crate ships a binned
//! Poisson reference engine in `backends::poisson`.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisBackend::fit`] owns its retry policy: it returns an error
//!   only after [`FitConfig::max_attempts`] unsuccessful attempts.
//! - Queries take `&self`; anything that changes model state takes
//!   `&mut self` and is undone by the caller through snapshots.
//!
//! Conventions
//! -----------
//! - Sources are addressed by name. Unknown names yield
//!   `FitError::UnknownSource`.
//! - Log-likelihoods are natural-log values of the full model; only their
//!   differences are interpreted.
use crate::fitting::{
    errors::{FitError, FitResult},
    snapshot::ParameterSnapshot,
};
use serde::{Deserialize, Serialize};

/// Role of a model component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceRole {
    /// Diffuse or instrumental background.
    Background,
    /// Astrophysical source (including the source of interest).
    Source,
}

/// Integrated flux of a source and its 1σ uncertainty.
///
/// `flux_err` is NaN when the backend cannot estimate it (e.g. the
/// normalization is fixed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxEstimate {
    pub flux: f64,
    pub flux_err: f64,
}

/// Per-fit settings handed to the backend.
///
/// Default: 3 attempts, analytic gradients where available, quiet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub max_attempts: usize,
    pub use_gradient: bool,
    pub verbose: bool,
}

impl FitConfig {
    /// Errors
    /// ------
    /// - [`FitError::InvalidMaxAttempts`] when `max_attempts == 0`.
    pub fn new(max_attempts: usize, use_gradient: bool, verbose: bool) -> FitResult<Self> {
        if max_attempts == 0 {
            return Err(FitError::InvalidMaxAttempts);
        }
        Ok(Self { max_attempts, use_gradient, verbose })
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { max_attempts: 3, use_gradient: true, verbose: false }
    }
}

/// AnalysisBackend — a spectral maximum-likelihood engine bound to one
/// time interval.
///
/// Required
/// --------
/// - `fit(config)`: maximize the likelihood over the currently free
///   parameters, retrying up to `config.max_attempts` times.
/// - `log_likelihood()`: `ℓ` at the current parameters.
/// - `test_statistic(source, reoptimize, config)`: `2 (ℓ_with − ℓ_without)`
///   for `source`; with `reoptimize`, the other free parameters are refit
///   without the source. Model state is unchanged afterwards.
/// - `sources(role)`, `role_of(name)`: model inventory.
/// - `set_free(source, free)`: free or freeze every parameter of `source`.
/// - `restrict_to_normalization_only(source)`: free only the
///   normalization of `source`, fixing its shape parameters.
/// - `flux(source)`: integrated flux and uncertainty at the current state.
/// - `normalization`, `set_normalization`: direct access to the
///   normalization parameter.
/// - `snapshot()`, `restore(snapshot)`: save/restore all parameter values
///   and free flags.
pub trait AnalysisBackend {
    fn fit(&mut self, config: &FitConfig) -> FitResult<()>;

    fn log_likelihood(&self) -> FitResult<f64>;

    fn test_statistic(
        &mut self, source: &str, reoptimize: bool, config: &FitConfig,
    ) -> FitResult<f64>;

    fn sources(&self, role: SourceRole) -> Vec<String>;

    fn role_of(&self, source: &str) -> Option<SourceRole>;

    fn set_free(&mut self, source: &str, free: bool) -> FitResult<()>;

    fn restrict_to_normalization_only(&mut self, source: &str) -> FitResult<()>;

    fn flux(&self, source: &str) -> FitResult<FluxEstimate>;

    fn normalization(&self, source: &str) -> FitResult<f64>;

    fn set_normalization(&mut self, source: &str, value: f64) -> FitResult<()>;

    fn snapshot(&self) -> ParameterSnapshot;

    fn restore(&mut self, snapshot: &ParameterSnapshot) -> FitResult<()>;
}
