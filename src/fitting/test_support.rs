//! Deterministic in-memory backend for unit tests.
//!
//! The likelihood depends only on the normalization `N` of the source of
//! interest: `ℓ(N) = ℓ_max − (N − N̂)² / (2σ²)`. Fits move `N` to `N̂` when
//! it is free; other components are bookkeeping only. `flux = 2·N`.
use crate::fitting::{
    backend::{AnalysisBackend, FitConfig, FluxEstimate, SourceRole},
    errors::{FitError, FitResult},
    snapshot::{ParameterSnapshot, ParameterState},
};

pub(crate) const LL_MAX: f64 = -100.0;

pub(crate) struct MockBackend {
    pub source: String,
    pub n_hat: f64,
    pub sigma: f64,
    pub state: ParameterSnapshot,
    pub roles: Vec<(String, SourceRole)>,
    /// State observed at the start of every `fit` call.
    pub fit_log: Vec<ParameterSnapshot>,
    /// Fail the fit with this 1-based call index.
    pub fail_on_fit: Option<usize>,
}

impl MockBackend {
    /// Source of interest "src" plus a background "bkg" and another source
    /// "other"; all parameters start free.
    pub fn new(source: &str, n_hat: f64, sigma: f64, initial_norm: f64) -> Self {
        let free = |value| ParameterState { value, free: true };
        let state = ParameterSnapshot::new()
            .with(source, "norm", free(initial_norm))
            .with(source, "index", free(2.0))
            .with("bkg", "norm", free(1.0))
            .with("other", "norm", free(0.3));
        Self {
            source: source.to_string(),
            n_hat,
            sigma,
            state,
            roles: vec![
                (source.to_string(), SourceRole::Source),
                ("bkg".to_string(), SourceRole::Background),
                ("other".to_string(), SourceRole::Source),
            ],
            fit_log: Vec::new(),
            fail_on_fit: None,
        }
    }

    pub fn quadratic(source: &str, n_hat: f64, sigma: f64) -> Self {
        Self::new(source, n_hat, sigma, n_hat)
    }

    fn ll_at(&self, norm: f64) -> f64 {
        let d = norm - self.n_hat;
        if d == 0.0 { LL_MAX } else { LL_MAX - d * d / (2.0 * self.sigma * self.sigma) }
    }

    fn param(&self, source: &str, parameter: &str) -> FitResult<ParameterState> {
        self.state.get(source, parameter).ok_or_else(|| FitError::UnknownSource {
            name: source.to_string(),
        })
    }

    fn params_of(&self, source: &str) -> Vec<String> {
        self.state.iter().filter(|(s, _, _)| *s == source).map(|(_, p, _)| p.to_string()).collect()
    }
}

impl AnalysisBackend for MockBackend {
    fn fit(&mut self, _config: &FitConfig) -> FitResult<()> {
        self.fit_log.push(self.state.clone());
        if self.fail_on_fit == Some(self.fit_log.len()) {
            return Err(FitError::DidNotConverge { attempts: 1, status: "mock".to_string() });
        }
        let src = self.source.clone();
        let norm = self.param(&src, "norm")?;
        if norm.free {
            self.state.insert(&src, "norm", ParameterState { value: self.n_hat.max(0.0), ..norm });
        }
        Ok(())
    }

    fn log_likelihood(&self) -> FitResult<f64> {
        Ok(self.ll_at(self.param(&self.source, "norm")?.value))
    }

    fn test_statistic(
        &mut self, source: &str, _reoptimize: bool, _config: &FitConfig,
    ) -> FitResult<f64> {
        let norm = self.param(source, "norm")?.value;
        if source != self.source {
            return Ok(0.0);
        }
        Ok(2.0 * (self.ll_at(norm) - self.ll_at(0.0)))
    }

    fn sources(&self, role: SourceRole) -> Vec<String> {
        self.roles.iter().filter(|(_, r)| *r == role).map(|(n, _)| n.clone()).collect()
    }

    fn role_of(&self, source: &str) -> Option<SourceRole> {
        self.roles.iter().find(|(n, _)| n == source).map(|(_, r)| *r)
    }

    fn set_free(&mut self, source: &str, free: bool) -> FitResult<()> {
        let names = self.params_of(source);
        if names.is_empty() {
            return Err(FitError::UnknownSource { name: source.to_string() });
        }
        for p in names {
            let st = self.param(source, &p)?;
            self.state.insert(source, &p, ParameterState { free, ..st });
        }
        Ok(())
    }

    fn restrict_to_normalization_only(&mut self, source: &str) -> FitResult<()> {
        self.set_free(source, false)?;
        let norm = self.param(source, "norm")?;
        self.state.insert(source, "norm", ParameterState { free: true, ..norm });
        Ok(())
    }

    fn flux(&self, source: &str) -> FitResult<FluxEstimate> {
        let norm = self.param(source, "norm")?;
        let flux_err = if norm.free { 2.0 * self.sigma } else { f64::NAN };
        Ok(FluxEstimate { flux: 2.0 * norm.value, flux_err })
    }

    fn normalization(&self, source: &str) -> FitResult<f64> {
        Ok(self.param(source, "norm")?.value)
    }

    fn set_normalization(&mut self, source: &str, value: f64) -> FitResult<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(FitError::InvalidNormalization { source: source.to_string(), value });
        }
        let norm = self.param(source, "norm")?;
        self.state.insert(source, "norm", ParameterState { value, ..norm });
        Ok(())
    }

    fn snapshot(&self) -> ParameterSnapshot {
        self.state.clone()
    }

    fn restore(&mut self, snapshot: &ParameterSnapshot) -> FitResult<()> {
        self.state = snapshot.clone();
        Ok(())
    }
}
