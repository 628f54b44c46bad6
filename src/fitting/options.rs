//! fitting::options — validated configuration of the per-bin protocol.
use crate::fitting::{
    backend::FitConfig,
    errors::{FitError, FitResult},
};

/// Options controlling [`PerBinFitter`](crate::fitting::PerBinFitter).
///
/// Fields
/// ------
/// - `refit_background`: leave background components free in each bin.
/// - `refit_other_sources`: leave other sources free in each bin.
/// - `min_ts`: below this per-bin TS an upper limit is computed.
/// - `always_upper_limit`: compute an upper limit for every bin.
/// - `ul_confidence`: upper-limit confidence level in (0.5, 1).
/// - `fit`: settings forwarded to every backend fit.
///
/// Default: refit everything, `min_ts = 4`, upper limits only below
/// threshold at 95% confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitterOptions {
    pub refit_background: bool,
    pub refit_other_sources: bool,
    pub min_ts: f64,
    pub always_upper_limit: bool,
    pub ul_confidence: f64,
    pub fit: FitConfig,
}

impl Default for FitterOptions {
    fn default() -> Self {
        Self {
            refit_background: true,
            refit_other_sources: true,
            min_ts: 4.0,
            always_upper_limit: false,
            ul_confidence: 0.95,
            fit: FitConfig::default(),
        }
    }
}

impl FitterOptions {
    /// Errors
    /// ------
    /// - [`FitError::InvalidMinTs`] for a negative or non-finite `min_ts`.
    /// - [`FitError::InvalidConfidence`] unless `0.5 < ul_confidence < 1`.
    pub fn new(
        refit_background: bool, refit_other_sources: bool, min_ts: f64, always_upper_limit: bool,
        ul_confidence: f64, fit: FitConfig,
    ) -> FitResult<Self> {
        let opts = Self {
            refit_background,
            refit_other_sources,
            min_ts,
            always_upper_limit,
            ul_confidence,
            fit,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check invariants; used after field-wise construction.
    pub fn validate(&self) -> FitResult<()> {
        if !self.min_ts.is_finite() || self.min_ts < 0.0 {
            return Err(FitError::InvalidMinTs { value: self.min_ts });
        }
        validate_confidence(self.ul_confidence)?;
        if self.fit.max_attempts == 0 {
            return Err(FitError::InvalidMaxAttempts);
        }
        Ok(())
    }

    /// Whether a bin with test statistic `ts` needs an upper limit.
    pub fn needs_upper_limit(&self, ts: f64) -> bool {
        self.always_upper_limit || !(ts >= self.min_ts)
    }
}

/// Errors
/// ------
/// - [`FitError::InvalidConfidence`] unless `0.5 < confidence < 1`.
pub fn validate_confidence(confidence: f64) -> FitResult<()> {
    if confidence > 0.5 && confidence < 1.0 {
        Ok(())
    } else {
        Err(FitError::InvalidConfidence { value: confidence })
    }
}
