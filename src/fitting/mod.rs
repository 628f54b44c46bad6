//! fitting — the per-bin likelihood protocol on top of an analysis engine.
//!
//! Purpose
//! -------
//! Define the engine contract ([`AnalysisBackend`]) and drive it through the
//! all-time reference fit and the constrained two-stage per-bin fit that the
//! variability statistic is built from.
//!
//! Key behaviors
//! -------------
//! - [`PerBinFitter`] records `ℓ_frozen`, `ℓ_free`, flux, TS and an optional
//!   upper limit per bin.
//! - [`UpperLimitEstimator`] is a pluggable collaborator; the default is
//!   the profile-likelihood [`ProfileUpperLimit`].
//! - [`SnapshotGuard`] restores backend state on every exit path.
//!
//! Conventions
//! -----------
//! - Errors are [`FitError`] via [`FitResult`]. Configuration problems are
//!   raised before the first fit.

pub mod backend;
pub mod errors;
pub mod options;
pub mod per_bin;
pub mod results;
pub mod snapshot;
pub mod upper_limit;

#[cfg(test)]
pub(crate) mod test_support;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::backend::{AnalysisBackend, FitConfig, FluxEstimate, SourceRole};
pub use self::errors::{FitError, FitResult};
pub use self::options::FitterOptions;
pub use self::per_bin::PerBinFitter;
pub use self::results::{AllTimeFit, AllTimeOutcome, BinFitResult, UpperLimit};
pub use self::snapshot::{ParameterSnapshot, ParameterState, SnapshotGuard};
pub use self::upper_limit::{ProfileUpperLimit, UpperLimitEstimator, likelihood_drop};

pub mod prelude {
    pub use super::backend::{AnalysisBackend, FitConfig, FluxEstimate, SourceRole};
    pub use super::errors::{FitError, FitResult};
    pub use super::options::FitterOptions;
    pub use super::per_bin::PerBinFitter;
    pub use super::results::{AllTimeFit, BinFitResult, UpperLimit};
    pub use super::upper_limit::{ProfileUpperLimit, UpperLimitEstimator};
}
