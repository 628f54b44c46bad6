//! backends::poisson::backend — reference [`AnalysisBackend`] over a binned
//! Poisson likelihood.
//!
//! Purpose
//! -------
//! Provide a complete, self-contained analysis engine so the variability
//! pipeline can run without an instrument toolchain: a set of power-law
//! components, one counts spectrum, and L-BFGS fits through
//! [`maximize`].
//!
//! Key behaviors
//! -------------
//! - `fit` retries up to `FitConfig::max_attempts` times, switching the
//!   line search on every retry and starting from the best point reached
//!   so far. With no free parameters it is a no-op.
//! - `test_statistic` compares the current state with the source's
//!   normalization forced to zero, refitting the other free parameters when
//!   asked; the model is restored afterwards.
//! - `flux` integrates the source spectrum over the binning range; its
//!   uncertainty propagates the observed-information covariance of the
//!   free parameters through the flux Jacobian.
//!
//! Invariants & assumptions
//! ------------------------
//! - Component names are unique; normalizations are never negative.
//! - Snapshots contain exactly the `norm` and `index` of every component.
use crate::{
    backends::poisson::{
        data::CountsSpectrum,
        errors::{PoissonError, PoissonResult},
        likelihood::{ParamKind, PoissonLikelihood, log_likelihood},
        model::{INDEX, NORM, PowerLawSource},
    },
    fitting::{
        AnalysisBackend, FitConfig, FitError, FitResult, FluxEstimate, ParameterSnapshot,
        ParameterState, SnapshotGuard, SourceRole,
    },
    inference::hessian::{calc_covariance, delta_method_variance},
    optimization::{
        loglik_optimizer::{LogLikelihood, MLEOptions, Theta, maximize},
        numerical_stability::transformations::safe_logistic,
    },
};
use ndarray::Array1;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct PoissonBackend {
    sources: Vec<PowerLawSource>,
    data: CountsSpectrum,
    mle: MLEOptions,
}

impl PoissonBackend {
    /// Errors
    /// ------
    /// - [`PoissonError::NoComponents`] for an empty model.
    /// - [`PoissonError::DuplicateSource`] for repeated names.
    pub fn new(
        sources: Vec<PowerLawSource>, data: CountsSpectrum, mle: MLEOptions,
    ) -> PoissonResult<Self> {
        if sources.is_empty() {
            return Err(PoissonError::NoComponents);
        }
        let mut seen = HashSet::new();
        for s in &sources {
            if !seen.insert(s.name.as_str()) {
                return Err(PoissonError::DuplicateSource { name: s.name.clone() });
            }
        }
        Ok(Self { sources, data, mle })
    }

    pub fn data(&self) -> &CountsSpectrum {
        &self.data
    }

    pub fn components(&self) -> &[PowerLawSource] {
        &self.sources
    }

    fn position(&self, source: &str) -> FitResult<usize> {
        self.sources
            .iter()
            .position(|s| s.name == source)
            .ok_or_else(|| FitError::UnknownSource { name: source.to_string() })
    }

    fn component_mut(&mut self, source: &str) -> FitResult<&mut PowerLawSource> {
        let idx = self.position(source)?;
        Ok(&mut self.sources[idx])
    }

    fn likelihood(&self, use_gradient: bool) -> PoissonLikelihood {
        PoissonLikelihood::new(self.sources.clone(), use_gradient)
    }

    /// 1σ flux error of component `idx`, NaN when none of its parameters
    /// is free.
    fn flux_error(&self, idx: usize) -> FitResult<f64> {
        let f = self.likelihood(true);
        if !f.free_params().iter().any(|p| p.source == idx) {
            return Ok(f64::NAN);
        }
        let theta_hat = f.theta0();
        let data = &self.data;
        let neg_grad = |t: &Array1<f64>| -> Array1<f64> {
            match f.grad(t, data) {
                Ok(g) => -g,
                Err(_) => Array1::from_elem(t.len(), f64::NAN),
            }
        };
        let cov = calc_covariance(&neg_grad, &theta_hat)?;

        let s = &self.sources[idx];
        let (emin, emax) = (data.binning.emin(), data.binning.emax());
        let jacobian: Array1<f64> = f
            .free_params()
            .iter()
            .zip(theta_hat.iter())
            .map(|(p, &t)| match (p.source == idx, p.kind) {
                (false, _) => 0.0,
                (true, ParamKind::Norm) => s.shape_integral(s.index, emin, emax) * safe_logistic(t),
                (true, ParamKind::Index) => s.norm * s.shape_integral_dindex(s.index, emin, emax),
            })
            .collect();
        Ok(delta_method_variance(&cov, &jacobian)?.sqrt())
    }
}

impl AnalysisBackend for PoissonBackend {
    fn fit(&mut self, config: &FitConfig) -> FitResult<()> {
        let f = self.likelihood(config.use_gradient);
        if f.dim() == 0 {
            log::debug!("no free parameters, skipping fit");
            return Ok(());
        }
        let mut opts = self.mle.clone();
        opts.verbose |= config.verbose;
        let mut theta: Theta = f.theta0();
        let mut status = String::new();
        for attempt in 1..=config.max_attempts {
            match maximize(&f, theta.clone(), &self.data, &opts) {
                Ok(outcome) if outcome.converged => {
                    self.sources = f.sources_at(&outcome.theta_hat);
                    log::debug!(
                        "fit converged on attempt {attempt}: ell = {:.6}, {} free parameters",
                        outcome.value,
                        f.dim()
                    );
                    return Ok(());
                }
                Ok(outcome) => {
                    status = outcome.status;
                    theta = outcome.theta_hat;
                }
                Err(err) => status = err.to_string(),
            }
            log::debug!(
                "fit attempt {attempt}/{} failed ({status}), retrying with {:?}",
                config.max_attempts,
                opts.line_searcher.alternate()
            );
            opts = opts.with_line_searcher(opts.line_searcher.alternate());
        }
        Err(FitError::DidNotConverge { attempts: config.max_attempts, status })
    }

    fn log_likelihood(&self) -> FitResult<f64> {
        Ok(log_likelihood(&self.sources, &self.data)?)
    }

    fn test_statistic(
        &mut self, source: &str, reoptimize: bool, config: &FitConfig,
    ) -> FitResult<f64> {
        let ll_with = self.log_likelihood()?;
        let mut guard = SnapshotGuard::new(self);
        guard.set_free(source, false)?;
        guard.set_normalization(source, 0.0)?;
        if reoptimize {
            guard.fit(config)?;
        }
        let ll_without = guard.log_likelihood()?;
        guard.restore_now()?;
        Ok(2.0 * (ll_with - ll_without))
    }

    fn sources(&self, role: SourceRole) -> Vec<String> {
        self.sources.iter().filter(|s| s.role == role).map(|s| s.name.clone()).collect()
    }

    fn role_of(&self, source: &str) -> Option<SourceRole> {
        self.sources.iter().find(|s| s.name == source).map(|s| s.role)
    }

    fn set_free(&mut self, source: &str, free: bool) -> FitResult<()> {
        let s = self.component_mut(source)?;
        s.norm_free = free;
        s.index_free = free;
        Ok(())
    }

    fn restrict_to_normalization_only(&mut self, source: &str) -> FitResult<()> {
        let s = self.component_mut(source)?;
        s.norm_free = true;
        s.index_free = false;
        Ok(())
    }

    fn flux(&self, source: &str) -> FitResult<FluxEstimate> {
        let idx = self.position(source)?;
        let binning = &self.data.binning;
        let flux = self.sources[idx].flux(binning.emin(), binning.emax());
        let flux_err = self.flux_error(idx)?;
        Ok(FluxEstimate { flux, flux_err })
    }

    fn normalization(&self, source: &str) -> FitResult<f64> {
        Ok(self.sources[self.position(source)?].norm)
    }

    fn set_normalization(&mut self, source: &str, value: f64) -> FitResult<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(FitError::InvalidNormalization { source: source.to_string(), value });
        }
        self.component_mut(source)?.norm = value;
        Ok(())
    }

    fn snapshot(&self) -> ParameterSnapshot {
        self.sources.iter().fold(ParameterSnapshot::new(), |snap, s| {
            snap.with(&s.name, NORM, ParameterState { value: s.norm, free: s.norm_free })
                .with(&s.name, INDEX, ParameterState { value: s.index, free: s.index_free })
        })
    }

    fn restore(&mut self, snapshot: &ParameterSnapshot) -> FitResult<()> {
        for (source, parameter, state) in snapshot.iter() {
            let s = self.component_mut(source)?;
            match parameter {
                NORM => {
                    s.norm = state.value;
                    s.norm_free = state.free;
                }
                INDEX => {
                    s.index = state.value;
                    s.index_free = state.free;
                }
                _ => {
                    return Err(FitError::UnknownParameter {
                        source: source.to_string(),
                        parameter: parameter.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
