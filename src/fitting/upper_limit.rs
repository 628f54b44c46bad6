//! fitting::upper_limit — flux upper limits for faint time bins.
//!
//! Purpose
//! -------
//! When a bin's test statistic falls below threshold, the per-bin fitter
//! asks an [`UpperLimitEstimator`] for a flux upper limit at the configured
//! confidence. Instrument toolchains usually bring their own estimator;
//! [`ProfileUpperLimit`] is a backend-agnostic profile-likelihood version.
//!
//! Key behaviors
//! -------------
//! - The limit is the normalization `N_ul ≥ N̂` where
//!   `2 (ℓ(N̂) − ℓ(N_ul)) = z²`, with `z` the standard normal quantile at the
//!   confidence level (the one-sided χ²(1) threshold; 2.71 at 95%).
//! - The root is bracketed by doubling from the best fit and then refined
//!   with Argmin's Brent root finder.
//! - With `reoptimize`, the other free parameters are refit at every trial
//!   normalization (profile likelihood); otherwise they stay at the best fit.
//! - The backend is restored to its prior state on every exit path.
use crate::fitting::{
    backend::{AnalysisBackend, FitConfig},
    errors::{FitError, FitResult},
    options::validate_confidence,
    results::UpperLimit,
    snapshot::SnapshotGuard,
};
use argmin::{
    core::{CostFunction, Error, Executor, State},
    solver::brent::BrentRoot,
};
use statrs::distribution::{ContinuousCDF, Normal};
use std::cell::RefCell;

/// Doublings of the search interval before giving up on a bracket.
const MAX_BRACKET_DOUBLINGS: usize = 200;

/// Collaborator that turns a backend state into a flux upper limit.
pub trait UpperLimitEstimator {
    /// Errors
    /// ------
    /// - `FitError::InvalidConfidence` for a confidence outside (0.5, 1).
    /// - Any backend or solver failure.
    fn compute(
        &self, backend: &mut dyn AnalysisBackend, source: &str, confidence: f64,
        config: &FitConfig,
    ) -> FitResult<UpperLimit>;
}

/// Profile-likelihood upper limit on the normalization of a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileUpperLimit {
    pub reoptimize: bool,
    pub max_iters: u64,
}

impl Default for ProfileUpperLimit {
    fn default() -> Self {
        Self { reoptimize: true, max_iters: 100 }
    }
}

/// `2Δℓ` threshold for a one-sided limit at `confidence`.
///
/// Errors
/// ------
/// - [`FitError::InvalidConfidence`] outside (0.5, 1).
pub fn likelihood_drop(confidence: f64) -> FitResult<f64> {
    validate_confidence(confidence)?;
    let normal = Normal::new(0.0, 1.0).map_err(|e| FitError::Backend { text: e.to_string() })?;
    let z = normal.inverse_cdf(confidence);
    Ok(z * z)
}

/// `f(N) = 2 (ℓ̂ − ℓ(N)) − Δ`, negative inside the limit and positive
/// beyond it.
struct ProfileDrop<'a> {
    backend: RefCell<&'a mut dyn AnalysisBackend>,
    source: &'a str,
    ll_hat: f64,
    delta: f64,
    reoptimize: bool,
    config: FitConfig,
}

impl ProfileDrop<'_> {
    fn eval(&self, norm: f64) -> FitResult<f64> {
        let mut backend = self.backend.borrow_mut();
        backend.set_normalization(self.source, norm)?;
        if self.reoptimize {
            backend.fit(&self.config)?;
        }
        let ll = backend.log_likelihood()?;
        if !ll.is_finite() {
            return Err(FitError::NonFiniteLikelihood { stage: "upper-limit profile", value: ll });
        }
        Ok(2.0 * (self.ll_hat - ll) - self.delta)
    }
}

impl CostFunction for ProfileDrop<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, norm: &f64) -> Result<f64, Error> {
        Ok(self.eval(*norm)?)
    }
}

impl UpperLimitEstimator for ProfileUpperLimit {
    fn compute(
        &self, backend: &mut dyn AnalysisBackend, source: &str, confidence: f64,
        config: &FitConfig,
    ) -> FitResult<UpperLimit> {
        let delta = likelihood_drop(confidence)?;
        let mut guard = SnapshotGuard::new(backend);

        let seed = guard.normalization(source)?;
        guard.restrict_to_normalization_only(source)?;
        guard.fit(config)?;
        let ll_hat = guard.log_likelihood()?;
        let n_hat = guard.normalization(source)?.max(0.0);
        guard.set_free(source, false)?;

        let n_ul = {
            let profile = ProfileDrop {
                backend: RefCell::new(&mut *guard),
                source,
                ll_hat,
                delta,
                reoptimize: self.reoptimize,
                config: *config,
            };
            let base = n_hat.max(seed);
            let mut upper = 2.0 * if base > 0.0 { base } else { 1.0 };
            let mut doublings = 0;
            while profile.eval(upper)? < 0.0 {
                doublings += 1;
                if doublings > MAX_BRACKET_DOUBLINGS {
                    return Err(FitError::UpperLimitBracket { source: source.to_string(), upper });
                }
                upper *= 2.0;
            }
            log::debug!("upper limit of '{source}' bracketed in [{n_hat:e}, {upper:e}]");

            let solver = BrentRoot::new(n_hat, upper, 1e-10 * upper);
            let max_iters = self.max_iters;
            let result = Executor::new(profile, solver)
                .configure(|state| state.max_iters(max_iters))
                .run()
                .map_err(FitError::from_argmin)?;
            let state = result.state();
            state.get_best_param().or(state.get_param()).copied().ok_or_else(|| {
                FitError::Backend { text: "root finder returned no normalization".to_string() }
            })?
        };

        guard.set_normalization(source, n_ul)?;
        let flux = guard.flux(source)?.flux;
        guard.restore_now()?;
        Ok(UpperLimit { flux, confidence })
    }
}
