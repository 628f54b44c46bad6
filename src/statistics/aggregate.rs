//! statistics::aggregate — combine per-bin likelihood ratios into TS_var.
//!
//! Purpose
//! -------
//! Turn the per-bin fit results of one backend into the variability test
//! statistic
//!
//! ```text
//! TS_var = Σ_i 2 (ℓ_free,i − ℓ_frozen,i) · w_i
//! w_i    = Δ_i² / (Δ_i² + f_sys² F0²),   Δ_i = F_i − F0
//! ```
//!
//! where `F0` is the all-time flux and `f_sys` the systematic fraction.
//!
//! Key behaviors
//! -------------
//! - Bins whose flux barely deviates from the all-time flux are damped
//!   towards zero weight; large deviations keep weight ≈ 1.
//! - A NaN weight (NaN flux, or `0/0` when both `Δ` and `F0` vanish) is
//!   replaced by 1, flagged on the [`BinContribution`] and logged at `warn`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `f_sys` is finite and non-negative.
//! - Each backend is aggregated independently against its own `F0`.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the weight limits (`Δ = 0`, `|Δ| → ∞`), the NaN
//!   substitution, and a hand-computed multi-bin TS_var.
use crate::{
    fitting::results::{AllTimeFit, BinFitResult},
    statistics::errors::{StatError, StatResult},
};
use serde::{Deserialize, Serialize};

/// Fractional systematic uncertainty on the flux used for damping.
pub const DEFAULT_SYSTEMATIC_FRACTION: f64 = 0.02;

/// Per-bin breakdown of the TS_var sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinContribution {
    /// `2 (ℓ_free − ℓ_frozen)`.
    pub likelihood_ratio: f64,
    /// `F_bin − F0`.
    pub flux_deviation: f64,
    pub weight: f64,
    /// The computed weight was NaN and has been replaced by 1.
    pub weight_substituted: bool,
    /// `likelihood_ratio · weight`.
    pub contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariabilityAggregator {
    systematic_fraction: f64,
}

impl Default for VariabilityAggregator {
    fn default() -> Self {
        Self { systematic_fraction: DEFAULT_SYSTEMATIC_FRACTION }
    }
}

impl VariabilityAggregator {
    /// Errors
    /// ------
    /// - [`StatError::InvalidSystematicFraction`] for a negative or
    ///   non-finite fraction.
    pub fn new(systematic_fraction: f64) -> StatResult<Self> {
        if !systematic_fraction.is_finite() || systematic_fraction < 0.0 {
            return Err(StatError::InvalidSystematicFraction { value: systematic_fraction });
        }
        Ok(Self { systematic_fraction })
    }

    pub fn systematic_fraction(&self) -> f64 {
        self.systematic_fraction
    }

    /// damping_weight — flux-deviation weight of one bin.
    ///
    /// Returns
    /// -------
    /// `(f64, bool)`
    ///   The weight in `[0, 1]` and whether a NaN was replaced by 1. An
    ///   infinite deviation against a finite reference is weighted 1
    ///   without substitution.
    pub fn damping_weight(&self, flux: f64, reference_flux: f64) -> (f64, bool) {
        let df = flux - reference_flux;
        let sys = self.systematic_fraction * reference_flux;
        if df.is_infinite() && sys.is_finite() {
            return (1.0, false);
        }
        let weight = df * df / (df * df + sys * sys);
        if weight.is_nan() { (1.0, true) } else { (weight, false) }
    }

    /// Contribution of a single bin given its likelihood ratio
    /// `2 (ℓ_free − ℓ_frozen)` and best-fit flux.
    pub fn contribution_from(
        &self, likelihood_ratio: f64, flux: f64, reference_flux: f64,
    ) -> BinContribution {
        let (weight, weight_substituted) = self.damping_weight(flux, reference_flux);
        BinContribution {
            likelihood_ratio,
            flux_deviation: flux - reference_flux,
            weight,
            weight_substituted,
            contribution: likelihood_ratio * weight,
        }
    }

    /// contributions — per-bin breakdown for one backend.
    ///
    /// Parameters
    /// ----------
    /// - `all_time`: `&AllTimeFit`
    ///   Supplies the reference flux `F0`.
    /// - `bins`: `&[BinFitResult]`
    ///   Per-bin fits in chronological order.
    ///
    /// Errors
    /// ------
    /// - [`StatError::NoBins`] when `bins` is empty.
    pub fn contributions(
        &self, all_time: &AllTimeFit, bins: &[BinFitResult],
    ) -> StatResult<Vec<BinContribution>> {
        if bins.is_empty() {
            return Err(StatError::NoBins);
        }
        let out = bins
            .iter()
            .enumerate()
            .map(|(index, bin)| {
                let c = self.contribution_from(bin.likelihood_ratio(), bin.flux, all_time.flux);
                if c.weight_substituted {
                    log::warn!(
                        "bin {index} ({}): damping weight is NaN (flux = {}, reference = {}), \
                         using 1",
                        bin.bin.label(),
                        bin.flux,
                        all_time.flux
                    );
                }
                c
            })
            .collect();
        Ok(out)
    }

    /// TS_var for one backend.
    ///
    /// Errors
    /// ------
    /// - [`StatError::NoBins`] when `bins` is empty.
    pub fn ts_var(&self, all_time: &AllTimeFit, bins: &[BinFitResult]) -> StatResult<f64> {
        Ok(sum_contributions(&self.contributions(all_time, bins)?))
    }
}

/// Sum of the per-bin contributions.
pub fn sum_contributions(contributions: &[BinContribution]) -> f64 {
    contributions.iter().map(|c| c.contribution).sum()
}
