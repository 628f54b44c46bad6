//! fitting::results — immutable outputs of the all-time and per-bin fits.
use crate::{binning::TimeBin, fitting::snapshot::ParameterSnapshot};
use serde::{Deserialize, Serialize};

/// Reference fit over the whole observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllTimeFit {
    pub flux: f64,
    pub flux_err: f64,
    pub test_statistic: f64,
}

/// All-time fit plus the best-fit state used to seed every bin.
#[derive(Debug, Clone, PartialEq)]
pub struct AllTimeOutcome {
    pub fit: AllTimeFit,
    pub best_fit: ParameterSnapshot,
}

/// Flux upper limit at a given confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpperLimit {
    pub flux: f64,
    pub confidence: f64,
}

/// Outcome of the two-stage fit of one time bin.
///
/// - `ll_frozen`: `ℓ` with the source of interest fixed at its all-time
///   state.
/// - `ll_free`: `ℓ` with its normalization refit.
/// - `flux`, `flux_err`: from the normalization-free fit.
/// - `test_statistic`: TS of the source in this bin, nuisance parameters
///   reoptimized.
/// - `upper_limit`: present when TS fell below threshold or limits were
///   forced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinFitResult {
    pub bin: TimeBin,
    pub ll_frozen: f64,
    pub ll_free: f64,
    pub flux: f64,
    pub flux_err: f64,
    pub test_statistic: f64,
    pub upper_limit: Option<UpperLimit>,
}

impl BinFitResult {
    /// `2 (ℓ_free − ℓ_frozen)`.
    pub fn likelihood_ratio(&self) -> f64 {
        2.0 * (self.ll_free - self.ll_frozen)
    }
}
