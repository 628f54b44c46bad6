//! statistics::significance — convert TS_var into a Gaussian sigma.
//!
//! Purpose
//! -------
//! Calibrate the variability statistic against its null distribution,
//! χ² with `nbins − 1` degrees of freedom, and express the tail
//! probability as a two-sided Gaussian significance:
//!
//! ```text
//! 2 · SF_N(0,1)(σ) = SF_χ²(nbins−1)(TS_var)
//! ```
//!
//! Key behaviors
//! -------------
//! - σ is found by minimizing the squared residual of the logarithm of the
//!   equation above with Argmin's Nelder–Mead solver, starting from σ = 1
//!   with an effectively exact standard-deviation tolerance. Working with
//!   `ln` keeps the cost resolvable when both tails are tiny (TS_var in the
//!   hundreds).
//! - `TS_var ≤ 0` maps to σ = 0 without running the solver.
//! - After the solve, the relative residual is checked; when the survival
//!   functions underflow (beyond ≈ 25σ) the result is a best effort and
//!   [`SigmaOutcome::converged`] is false. This is logged, not an error.
//!
//! Invariants & assumptions
//! ------------------------
//! - `nbins ≥ 2` and `TS_var` finite.
//! - The returned σ is non-negative.
use crate::{
    optimization::errors::OptError,
    statistics::errors::{StatError, StatResult},
};
use argmin::{
    core::{CostFunction, Error, Executor, State},
    solver::neldermead::NelderMead,
};
use ndarray::{Array1, array};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Relative residual below which a solution counts as resolved.
pub const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// Default iteration cap for the Nelder–Mead search.
pub const DEFAULT_MAX_ITERS: u64 = 1000;

/// Result of one calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaOutcome {
    pub sigma: f64,
    /// The relative residual at `sigma` is within [`RESIDUAL_TOLERANCE`].
    pub converged: bool,
    pub iterations: u64,
    /// `|2 SF_N(σ) − p| / p` with `p = SF_χ²(TS_var)`; absolute when `p = 0`.
    pub residual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceCalibrator {
    max_iters: u64,
}

impl Default for SignificanceCalibrator {
    fn default() -> Self {
        Self { max_iters: DEFAULT_MAX_ITERS }
    }
}

/// Squared log residual `(ln 2 SF_N(σ) − ln p)²` as an Argmin cost.
///
/// Tails below `f64::MIN_POSITIVE` are clamped there, so the cost stays
/// finite past the underflow point of either distribution.
struct SurvivalResidual {
    target: f64,
    log_target: f64,
    normal: Normal,
}

impl SurvivalResidual {
    fn new(target: f64, normal: Normal) -> Self {
        Self { target, log_target: clamped_ln(target), normal }
    }

    /// `2 SF_N(σ) − p`.
    fn residual(&self, sigma: f64) -> f64 {
        2.0 * self.normal.sf(sigma) - self.target
    }

    fn log_residual(&self, sigma: f64) -> f64 {
        clamped_ln(2.0 * self.normal.sf(sigma)) - self.log_target
    }
}

fn clamped_ln(p: f64) -> f64 {
    p.max(f64::MIN_POSITIVE).ln()
}

impl CostFunction for SurvivalResidual {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let r = self.log_residual(param[0]);
        Ok(r * r)
    }
}

impl SignificanceCalibrator {
    pub fn new(max_iters: u64) -> Self {
        Self { max_iters: max_iters.max(1) }
    }

    /// calibrate — sigma for a TS_var over `nbins` time bins.
    ///
    /// Parameters
    /// ----------
    /// - `ts_var`: `f64`
    ///   Variability statistic; negative values are treated as 0.
    /// - `nbins`: `usize`
    ///   Number of time bins; the null has `nbins − 1` degrees of freedom.
    ///
    /// Returns
    /// -------
    /// `StatResult<SigmaOutcome>`
    ///
    /// Errors
    /// ------
    /// - [`StatError::InsufficientBins`] when `nbins < 2`.
    /// - [`StatError::NonFiniteTsVar`] for NaN or infinite `ts_var`.
    /// - [`StatError::Distribution`] / [`StatError::Optimizer`] when
    ///   `statrs` or Argmin fail.
    pub fn calibrate(&self, ts_var: f64, nbins: usize) -> StatResult<SigmaOutcome> {
        if nbins < 2 {
            return Err(StatError::InsufficientBins { nbins });
        }
        if !ts_var.is_finite() {
            return Err(StatError::NonFiniteTsVar { value: ts_var });
        }
        if ts_var <= 0.0 {
            return Ok(SigmaOutcome { sigma: 0.0, converged: true, iterations: 0, residual: 0.0 });
        }

        let chi2 = ChiSquared::new((nbins - 1) as f64)
            .map_err(|e| StatError::Distribution { text: e.to_string() })?;
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| StatError::Distribution { text: e.to_string() })?;
        // Underflowed or NaN tails count as 0.
        let target = chi2.sf(ts_var).max(0.0);
        let check = SurvivalResidual::new(target, normal);
        let problem = SurvivalResidual::new(target, normal);

        let solver = NelderMead::new(vec![array![1.0], array![1.05]])
            .with_sd_tolerance(f64::MIN_POSITIVE)
            .map_err(OptError::from)?;
        let max_iters = self.max_iters;
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()
            .map_err(OptError::from)?;

        let state = result.state();
        let iterations = state.get_iter();
        let sigma = state.get_best_param().map(|p| p[0]).ok_or(OptError::MissingThetaHat)?;
        let sigma = sigma.max(0.0);

        let raw = check.residual(sigma).abs();
        let residual = if target > 0.0 { raw / target } else { raw };
        let converged = target > 0.0 && residual <= RESIDUAL_TOLERANCE;
        if !converged {
            log::warn!(
                "significance for TS_var = {ts_var} over {nbins} bins is not resolved \
                 (sigma = {sigma:.4}, relative residual = {residual:e}, status = {:?})",
                state.get_termination_status()
            );
        }
        Ok(SigmaOutcome { sigma, converged, iterations, residual })
    }
}

/// Convenience wrapper returning only sigma with the default calibrator.
///
/// Errors
/// ------
/// - See [`SignificanceCalibrator::calibrate`].
pub fn ts_var_to_sigma(ts_var: f64, nbins: usize) -> StatResult<f64> {
    Ok(SignificanceCalibrator::default().calibrate(ts_var, nbins)?.sigma)
}
