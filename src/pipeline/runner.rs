//! pipeline::runner — end-to-end variability test over several backends.
//!
//! Purpose
//! -------
//! [`VariabilityTester`] runs the complete analysis for one source:
//!
//! 1. validate the backend set, plan the time bins and check every all-time
//!    backend for the source of interest,
//! 2. fit every backend over the full observation (the reference flux and
//!    the seed for all bins),
//! 3. for each bin, bind every backend to the interval and run the
//!    two-stage per-bin fit,
//! 4. per backend, aggregate TS_var and calibrate its significance.
//!
//! Key behaviors
//! -------------
//! - Configuration problems (bad binning, unknown source, invalid options,
//!   duplicate labels) are reported before the first fit: every backend's
//!   all-time engine is checked for the source of interest before any of
//!   them is fitted.
//! - Any failure after that aborts the run with the band index and backend
//!   label attached; bins are never skipped.
//! - Per-bin products go to `<root>/time_<start>_<stop>/<label>/`. Without
//!   a `savedir` they are deleted as each bin finishes and the root is
//!   removed when the run ends, on success and on error.
//!
//! Invariants & assumptions
//! ------------------------
//! - The run is deterministic: identical inputs give bit-identical
//!   reports.
//! - Every report covers the same bins in the same order.
use crate::{
    binning::{TimeBin, TimeBinPlanner, TimeRangeProvider},
    fitting::{
        AllTimeFit, AnalysisBackend, BinFitResult, FitError, ParameterSnapshot, PerBinFitter,
        UpperLimitEstimator,
    },
    pipeline::{
        errors::{VariabilityError, VariabilityResult},
        options::VariabilityOptions,
        provider::BackendProvider,
        report::{VariabilityReport, VariabilityRun},
        workspace::Workspace,
    },
    statistics::{SignificanceCalibrator, VariabilityAggregator, sum_contributions},
};
use std::collections::HashSet;

#[derive(Debug)]
pub struct VariabilityTester {
    name: String,
    options: VariabilityOptions,
    fitter: PerBinFitter,
    aggregator: VariabilityAggregator,
    calibrator: SignificanceCalibrator,
}

/// All-time result of one backend carried into the bin loop.
struct Reference {
    fit: AllTimeFit,
    seed: ParameterSnapshot,
}

impl VariabilityTester {
    /// Tester for the source called `name`.
    ///
    /// Errors
    /// ------
    /// - Validation errors of [`VariabilityOptions`].
    pub fn new(name: impl Into<String>, options: VariabilityOptions) -> VariabilityResult<Self> {
        let name = name.into();
        let aggregator = options.aggregator()?;
        let fitter = PerBinFitter::new(name.clone(), options.fitter)?;
        let calibrator = SignificanceCalibrator::default();
        Ok(Self { name, options, fitter, aggregator, calibrator })
    }

    /// Replace the upper-limit collaborator of the per-bin fitter.
    pub fn with_upper_limits(mut self, upper_limits: Box<dyn UpperLimitEstimator>) -> Self {
        self.fitter = self.fitter.with_upper_limits(upper_limits);
        self
    }

    pub fn with_calibrator(mut self, calibrator: SignificanceCalibrator) -> Self {
        self.calibrator = calibrator;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &VariabilityOptions {
        &self.options
    }

    /// Bins this tester would fit for the given observation coverage.
    ///
    /// Errors
    /// ------
    /// - [`VariabilityError::Binning`].
    pub fn plan_bins<S: TimeRangeProvider + ?Sized>(
        &self, span: &S,
    ) -> VariabilityResult<Vec<TimeBin>> {
        Ok(TimeBinPlanner::new(self.options.binning.clone()).plan(span)?)
    }

    /// run — execute the variability test on every provider.
    ///
    /// Parameters
    /// ----------
    /// - `providers`: `&mut [&mut dyn BackendProvider]`
    ///   One entry per analysis backend; labels must be unique.
    /// - `span`: `&S`
    ///   Time coverage used for uniform binning (ignored for explicit
    ///   bins).
    ///
    /// Returns
    /// -------
    /// `VariabilityResult<VariabilityRun>`
    ///   One report per provider, in provider order.
    ///
    /// Errors
    /// ------
    /// - [`VariabilityError::NoBackends`] / [`VariabilityError::DuplicateBackend`].
    /// - [`VariabilityError::Binning`] for an unusable binning request.
    /// - [`VariabilityError::Config`] when a backend does not know the
    ///   source (or knows it as background).
    /// - [`VariabilityError::AllTimeFit`] / [`VariabilityError::BinFit`]
    ///   for fit failures.
    /// - [`VariabilityError::Statistics`] when TS_var or sigma cannot be
    ///   computed (e.g. fewer than two bins).
    /// - Provider and workspace I/O errors.
    pub fn run<S: TimeRangeProvider + ?Sized>(
        &self, providers: &mut [&mut dyn BackendProvider], span: &S,
    ) -> VariabilityResult<VariabilityRun> {
        check_labels(providers)?;
        let bins = self.plan_bins(span)?;
        let mut all_time = Vec::with_capacity(providers.len());
        for provider in providers.iter_mut() {
            let backend = provider.all_time()?;
            self.fitter.validate(backend.as_ref()).map_err(VariabilityError::Config)?;
            all_time.push(backend);
        }
        let workspace = Workspace::new(
            self.options.savedir.as_deref(),
            self.options.savedir_prefix.as_deref(),
        )?;
        log::info!(
            "variability of '{}': {} bins, {} backend(s)",
            self.name,
            bins.len(),
            providers.len()
        );

        let mut references = Vec::with_capacity(providers.len());
        for (provider, backend) in providers.iter().zip(all_time) {
            references.push(self.reference_fit(provider.label(), backend)?);
        }

        let mut per_backend: Vec<Vec<_>> = vec![Vec::with_capacity(bins.len()); providers.len()];
        for (band, bin) in bins.iter().enumerate() {
            log::info!(
                "band {}/{}: {} ({:.2} days)",
                band + 1,
                bins.len(),
                bin.label(),
                bin.duration_days()
            );
            let dir = workspace.bin_dir(bin)?;
            for ((provider, reference), fits) in
                providers.iter_mut().zip(references.iter()).zip(per_backend.iter_mut())
            {
                let label = provider.label().to_string();
                let workdir = dir.path().join(&label);
                std::fs::create_dir_all(&workdir)
                    .map_err(|e| VariabilityError::io(&workdir, e))?;
                let mut backend = provider.bind_interval(bin, &reference.seed, &workdir)?;
                let fit = self
                    .fitter
                    .fit_bin(backend.as_mut(), bin)
                    .map_err(|source| bin_error(band, &label, source))?;
                fits.push(fit);
            }
        }

        let mut reports = Vec::with_capacity(providers.len());
        for ((provider, reference), fits) in providers.iter().zip(references).zip(per_backend) {
            reports.push(self.summarize(provider.label(), reference, fits, bins.len())?);
        }

        Ok(VariabilityRun {
            name: self.name.clone(),
            min_ts: self.options.fitter.min_ts,
            bins,
            reports,
        })
    }

    fn reference_fit(
        &self, label: &str, mut backend: Box<dyn AnalysisBackend>,
    ) -> VariabilityResult<Reference> {
        let outcome = self.fitter.fit_all_time(backend.as_mut()).map_err(|source| {
            if source.is_configuration() {
                VariabilityError::Config(source)
            } else {
                VariabilityError::AllTimeFit { backend: label.to_string(), source }
            }
        })?;
        Ok(Reference { fit: outcome.fit, seed: outcome.best_fit })
    }

    fn summarize(
        &self, label: &str, reference: Reference, bins: Vec<BinFitResult>, nbins: usize,
    ) -> VariabilityResult<VariabilityReport> {
        let stat_error =
            |source| VariabilityError::Statistics { backend: label.to_string(), source };
        let contributions =
            self.aggregator.contributions(&reference.fit, &bins).map_err(stat_error)?;
        let ts_var = sum_contributions(&contributions);
        let significance = self.calibrator.calibrate(ts_var, nbins).map_err(stat_error)?;
        log::info!(
            "'{}' with {label}: TS_var = {ts_var:.3}, sigma = {:.3}",
            self.name,
            significance.sigma
        );
        Ok(VariabilityReport {
            backend: label.to_string(),
            all_time: reference.fit,
            bins,
            contributions,
            ts_var,
            significance,
        })
    }
}

fn bin_error(band: usize, label: &str, source: FitError) -> VariabilityError {
    VariabilityError::BinFit { band, backend: label.to_string(), source }
}

fn check_labels(providers: &[&mut dyn BackendProvider]) -> VariabilityResult<()> {
    if providers.is_empty() {
        return Err(VariabilityError::NoBackends);
    }
    let mut seen = HashSet::new();
    for provider in providers {
        if !seen.insert(provider.label()) {
            return Err(VariabilityError::DuplicateBackend { label: provider.label().to_string() });
        }
    }
    Ok(())
}
