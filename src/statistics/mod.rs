//! statistics — variability test statistic and its significance.
//!
//! Purpose
//! -------
//! Combine per-bin fit results into TS_var ([`aggregate`]) and convert
//! TS_var into a two-sided Gaussian sigma ([`significance`]).
//!
//! Key behaviors
//! -------------
//! - [`VariabilityAggregator`] damps each bin's likelihood ratio by how far
//!   its flux deviates from the all-time flux, relative to a systematic
//!   fraction of that flux.
//! - [`SignificanceCalibrator`] solves for the sigma whose two-sided normal
//!   tail matches the χ²(nbins − 1) tail of TS_var.
//!
//! Conventions
//! -----------
//! - Errors are [`StatError`] via [`StatResult`]; numeric indeterminacy that
//!   has a defined fallback is logged instead of raised.

pub mod aggregate;
pub mod errors;
pub mod significance;

pub use self::aggregate::{
    BinContribution, DEFAULT_SYSTEMATIC_FRACTION, VariabilityAggregator, sum_contributions,
};
pub use self::errors::{StatError, StatResult};
pub use self::significance::{SigmaOutcome, SignificanceCalibrator, ts_var_to_sigma};

pub mod prelude {
    pub use super::aggregate::{BinContribution, VariabilityAggregator};
    pub use super::errors::{StatError, StatResult};
    pub use super::significance::{SigmaOutcome, SignificanceCalibrator, ts_var_to_sigma};
}
