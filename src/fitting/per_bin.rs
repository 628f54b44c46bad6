//! fitting::per_bin — the constrained two-stage fit of one time bin.
//!
//! Purpose
//! -------
//! Drive an [`AnalysisBackend`] bound to a sub-interval through the
//! variability protocol and collect a [`BinFitResult`]:
//!
//! 1. optionally freeze background components and other sources,
//! 2. freeze the source of interest entirely, fit, record `ℓ_frozen`,
//! 3. free only its normalization, refit, record `ℓ_free`, flux and TS,
//! 4. below `min_ts` (or always, if requested) compute an upper limit.
//!
//! The all-time reference fit ([`PerBinFitter::fit_all_time`]) uses the
//! same backend contract without constraints.
//!
//! Invariants & assumptions
//! ------------------------
//! - The backend arrives seeded with the all-time best fit; step 2 keeps
//!   the source at exactly those values.
//! - Every change made here is undone before returning, including on
//!   error, through [`SnapshotGuard`].
//! - An unknown source of interest, or one registered as a background
//!   component, is rejected before the first fit.
use crate::{
    binning::TimeBin,
    fitting::{
        backend::{AnalysisBackend, SourceRole},
        errors::{FitError, FitResult},
        options::FitterOptions,
        results::{AllTimeFit, AllTimeOutcome, BinFitResult},
        snapshot::SnapshotGuard,
        upper_limit::{ProfileUpperLimit, UpperLimitEstimator},
    },
};

pub struct PerBinFitter {
    source: String,
    options: FitterOptions,
    upper_limits: Box<dyn UpperLimitEstimator>,
}

impl std::fmt::Debug for PerBinFitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerBinFitter")
            .field("source", &self.source)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PerBinFitter {
    /// Fitter for `source` using [`ProfileUpperLimit`] for upper limits.
    ///
    /// Errors
    /// ------
    /// - Validation errors of `options`.
    pub fn new(source: impl Into<String>, options: FitterOptions) -> FitResult<Self> {
        options.validate()?;
        Ok(Self {
            source: source.into(),
            options,
            upper_limits: Box::new(ProfileUpperLimit::default()),
        })
    }

    /// Replace the upper-limit collaborator.
    pub fn with_upper_limits(mut self, upper_limits: Box<dyn UpperLimitEstimator>) -> Self {
        self.upper_limits = upper_limits;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn options(&self) -> &FitterOptions {
        &self.options
    }

    /// Check that the backend knows the source of interest as a source.
    ///
    /// Errors
    /// ------
    /// - [`FitError::UnknownSource`] / [`FitError::ConflictingRoles`].
    pub fn validate(&self, backend: &dyn AnalysisBackend) -> FitResult<()> {
        match backend.role_of(&self.source) {
            None => Err(FitError::UnknownSource { name: self.source.clone() }),
            Some(SourceRole::Background) => {
                Err(FitError::ConflictingRoles { name: self.source.clone() })
            }
            Some(SourceRole::Source) => Ok(()),
        }
    }

    /// fit_all_time — reference fit over the full observation.
    ///
    /// Fits with the backend's current free parameters, reads the flux and
    /// the TS of the source of interest (nuisances reoptimized), and keeps
    /// the fitted state on the backend for seeding the bins.
    ///
    /// Errors
    /// ------
    /// - Configuration errors from [`PerBinFitter::validate`].
    /// - Backend failures, including `DidNotConverge`.
    pub fn fit_all_time(&self, backend: &mut dyn AnalysisBackend) -> FitResult<AllTimeOutcome> {
        self.validate(backend)?;
        let config = &self.options.fit;
        backend.fit(config)?;
        finite(backend.log_likelihood()?, "all-time fit")?;
        let best_fit = backend.snapshot();
        let flux = backend.flux(&self.source)?;
        let test_statistic = backend.test_statistic(&self.source, true, config)?;
        log::info!(
            "all-time fit of '{}': flux = {:e} ± {:e}, TS = {:.2}",
            self.source,
            flux.flux,
            flux.flux_err,
            test_statistic
        );
        Ok(AllTimeOutcome {
            fit: AllTimeFit { flux: flux.flux, flux_err: flux.flux_err, test_statistic },
            best_fit,
        })
    }

    /// fit_bin — two-stage constrained fit of one time bin.
    ///
    /// Parameters
    /// ----------
    /// - `backend`: `&mut dyn AnalysisBackend`
    ///   Engine bound to `bin`, seeded with the all-time best fit.
    /// - `bin`: `&TimeBin`
    ///   Interval being fitted; carried into the result.
    ///
    /// Returns
    /// -------
    /// `FitResult<BinFitResult>`
    ///
    /// Errors
    /// ------
    /// - Configuration errors, raised before any fit.
    /// - Backend, upper-limit and non-finite likelihood failures. The
    ///   backend state is restored in every case.
    pub fn fit_bin(
        &self, backend: &mut dyn AnalysisBackend, bin: &TimeBin,
    ) -> FitResult<BinFitResult> {
        self.validate(backend)?;
        let opts = &self.options;
        let source = self.source.as_str();
        let mut guard = SnapshotGuard::new(backend);

        if !opts.refit_background {
            for name in guard.sources(SourceRole::Background) {
                guard.set_free(&name, false)?;
            }
        }
        if !opts.refit_other_sources {
            for name in guard.sources(SourceRole::Source) {
                if name != source {
                    guard.set_free(&name, false)?;
                }
            }
        }

        guard.set_free(source, false)?;
        log::debug!("{}: fitting with '{source}' frozen", bin.label());
        guard.fit(&opts.fit)?;
        let ll_frozen = finite(guard.log_likelihood()?, "frozen fit")?;

        guard.restrict_to_normalization_only(source)?;
        log::debug!("{}: fitting with the normalization of '{source}' free", bin.label());
        guard.fit(&opts.fit)?;
        let ll_free = finite(guard.log_likelihood()?, "normalization fit")?;
        let flux = guard.flux(source)?;
        let test_statistic = guard.test_statistic(source, true, &opts.fit)?;

        let upper_limit = if opts.needs_upper_limit(test_statistic) {
            log::debug!("{}: TS = {test_statistic:.2}, computing upper limit", bin.label());
            Some(self.upper_limits.compute(&mut *guard, source, opts.ul_confidence, &opts.fit)?)
        } else {
            None
        };
        guard.restore_now()?;

        Ok(BinFitResult {
            bin: *bin,
            ll_frozen,
            ll_free,
            flux: flux.flux,
            flux_err: flux.flux_err,
            test_statistic,
            upper_limit,
        })
    }
}

fn finite(value: f64, stage: &'static str) -> FitResult<f64> {
    if value.is_finite() { Ok(value) } else { Err(FitError::NonFiniteLikelihood { stage, value }) }
}
