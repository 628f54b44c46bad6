//! pipeline::options — validated configuration of a variability run.
//!
//! Purpose
//! -------
//! Gather everything a [`VariabilityTester`](crate::pipeline::VariabilityTester)
//! needs besides its collaborators: the time binning, the per-bin fitter
//! options, the systematic fraction of the damping weight, and where
//! per-bin products go.
//!
//! Key behaviors
//! -------------
//! - [`VariabilityOptions::new`] validates every field up front.
//! - [`VariabilityOptions::from_json`] accepts the flat keyword layout
//!   (`nbins`, `tstarts`, `tstops`, `min_ts`, `always_upper_limit`,
//!   `ul_confidence`, `refit_background`, `refit_other_sources`, `savedir`,
//!   `savedir_prefix`, `systematic_fraction`, plus the fit settings
//!   `max_attempts`, `use_gradient`, `verbose`); omitted keys take their
//!   defaults and unknown keys are rejected.
//!
//! Conventions
//! -----------
//! - `savedir = None` means per-bin products live in a temporary directory
//!   under `savedir_prefix` (or the system temp dir) and are deleted.
use crate::{
    binning::BinningSpec,
    fitting::{FitConfig, FitterOptions},
    pipeline::errors::{VariabilityError, VariabilityResult},
    statistics::{DEFAULT_SYSTEMATIC_FRACTION, VariabilityAggregator},
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct VariabilityOptions {
    pub binning: BinningSpec,
    pub fitter: FitterOptions,
    pub systematic_fraction: f64,
    pub savedir: Option<PathBuf>,
    pub savedir_prefix: Option<PathBuf>,
}

impl VariabilityOptions {
    /// Errors
    /// ------
    /// - [`VariabilityError::Config`] for invalid fitter options.
    /// - [`VariabilityError::InvalidOption`] for a systematic fraction that
    ///   is negative or not finite.
    pub fn new(
        binning: BinningSpec, fitter: FitterOptions, systematic_fraction: f64,
        savedir: Option<PathBuf>, savedir_prefix: Option<PathBuf>,
    ) -> VariabilityResult<Self> {
        let opts = Self { binning, fitter, systematic_fraction, savedir, savedir_prefix };
        opts.validate()?;
        Ok(opts)
    }

    /// Defaults for everything but the binning.
    pub fn with_binning(binning: BinningSpec) -> Self {
        Self {
            binning,
            fitter: FitterOptions::default(),
            systematic_fraction: DEFAULT_SYSTEMATIC_FRACTION,
            savedir: None,
            savedir_prefix: None,
        }
    }

    pub fn validate(&self) -> VariabilityResult<()> {
        self.fitter.validate()?;
        self.aggregator()?;
        Ok(())
    }

    /// Aggregator configured with this run's systematic fraction.
    pub fn aggregator(&self) -> VariabilityResult<VariabilityAggregator> {
        VariabilityAggregator::new(self.systematic_fraction).map_err(|e| {
            VariabilityError::InvalidOption { key: "systematic_fraction", reason: e.to_string() }
        })
    }

    /// Parse and validate the flat JSON keyword layout.
    ///
    /// Errors
    /// ------
    /// - [`VariabilityError::Serialization`] for malformed JSON, wrong types
    ///   or unknown keys.
    /// - [`VariabilityError::Binning`] for a missing, conflicting or partial
    ///   binning request.
    /// - Validation errors of [`VariabilityOptions::new`].
    pub fn from_json(text: &str) -> VariabilityResult<Self> {
        let raw: RawOptions = serde_json::from_str(text)?;
        raw.into_options()
    }
}

/// Flat keyword form with every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    nbins: Option<usize>,
    tstarts: Option<Vec<f64>>,
    tstops: Option<Vec<f64>>,
    min_ts: Option<f64>,
    always_upper_limit: Option<bool>,
    ul_confidence: Option<f64>,
    refit_background: Option<bool>,
    refit_other_sources: Option<bool>,
    savedir: Option<PathBuf>,
    savedir_prefix: Option<PathBuf>,
    systematic_fraction: Option<f64>,
    max_attempts: Option<usize>,
    use_gradient: Option<bool>,
    verbose: Option<bool>,
}

impl RawOptions {
    fn into_options(self) -> VariabilityResult<VariabilityOptions> {
        let binning = BinningSpec::from_parts(self.nbins, self.tstarts, self.tstops)?;
        let fit_defaults = FitConfig::default();
        let fit = FitConfig::new(
            self.max_attempts.unwrap_or(fit_defaults.max_attempts),
            self.use_gradient.unwrap_or(fit_defaults.use_gradient),
            self.verbose.unwrap_or(fit_defaults.verbose),
        )?;
        let defaults = FitterOptions::default();
        let fitter = FitterOptions::new(
            self.refit_background.unwrap_or(defaults.refit_background),
            self.refit_other_sources.unwrap_or(defaults.refit_other_sources),
            self.min_ts.unwrap_or(defaults.min_ts),
            self.always_upper_limit.unwrap_or(defaults.always_upper_limit),
            self.ul_confidence.unwrap_or(defaults.ul_confidence),
            fit,
        )?;
        VariabilityOptions::new(
            binning,
            fitter,
            self.systematic_fraction.unwrap_or(DEFAULT_SYSTEMATIC_FRACTION),
            self.savedir,
            self.savedir_prefix,
        )
    }
}
