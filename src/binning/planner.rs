//! binning::planner — partition an observation into time bins.
//!
//! Purpose
//! -------
//! Turn a binning request into an ordered list of [`TimeBin`]s. Two modes
//! exist and exactly one must be chosen:
//! - **Uniform**: `nbins` equal-width bins spanning the observation's
//!   `[earliest, latest]` envelope, with edges rounded to whole seconds.
//! - **Explicit**: caller-supplied parallel `tstarts`/`tstops`, truncated to
//!   whole seconds and kept in the caller's order.
//!
//! Key behaviors
//! -------------
//! - [`BinningSpec::from_parts`] maps the loose optional configuration
//!   (`nbins`, `tstarts`, `tstops`) to a spec, rejecting conflicting,
//!   missing, or partial requests up front.
//! - [`TimeBinPlanner::plan`] consults the [`TimeRangeProvider`] only in
//!   uniform mode.
//! - Uniform edges follow `earliest + k * (latest - earliest) / nbins`,
//!   rounded half-to-even; consecutive bins share an edge exactly.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every returned bin has finite bounds with `start < stop`.
//! - Uniform bins are contiguous and non-overlapping and cover the rounded
//!   span; explicit bins need not be contiguous, sorted, or disjoint.
//!
//! Testing notes
//! -------------
//! - Unit tests check contiguity, integer edges, configuration errors, and
//!   truncation of explicit edges.
use serde::{Deserialize, Serialize};

use crate::binning::{
    errors::{BinningError, BinningResult},
    span::{ObservationSpan, TimeRangeProvider},
};

/// Seconds per day used for `duration_days`.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// TimeBin — half-open interval `[start, stop)` in MET seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBin {
    start: f64,
    stop: f64,
}

impl TimeBin {
    /// Build a validated bin.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::NonFiniteTime`] for NaN/infinite bounds.
    /// - [`BinningError::DegenerateBin`] when `start >= stop`.
    pub fn new(start: f64, stop: f64) -> BinningResult<Self> {
        Self::checked(0, start, stop)
    }

    fn checked(index: usize, start: f64, stop: f64) -> BinningResult<Self> {
        if !start.is_finite() {
            return Err(BinningError::NonFiniteTime { index, value: start });
        }
        if !stop.is_finite() {
            return Err(BinningError::NonFiniteTime { index, value: stop });
        }
        if start >= stop {
            return Err(BinningError::DegenerateBin { index, start, stop });
        }
        Ok(Self { start, stop })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn duration_seconds(&self) -> f64 {
        self.stop - self.start
    }

    pub fn duration_days(&self) -> f64 {
        self.duration_seconds() / SECONDS_PER_DAY
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.stop
    }

    /// Directory-friendly label, e.g. `time_239557417_242149417`.
    pub fn label(&self) -> String {
        format!("time_{}_{}", self.start, self.stop)
    }
}

/// BinningSpec — validated choice between uniform and explicit binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BinningSpec {
    Uniform { nbins: usize },
    Explicit { tstarts: Vec<f64>, tstops: Vec<f64> },
}

impl BinningSpec {
    /// Uniform partition into `nbins` bins.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::ZeroBins`] when `nbins == 0`.
    pub fn uniform(nbins: usize) -> BinningResult<Self> {
        if nbins == 0 {
            return Err(BinningError::ZeroBins);
        }
        Ok(BinningSpec::Uniform { nbins })
    }

    /// Explicit bins from parallel start/stop lists.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::LengthMismatch`] for unequal lengths.
    /// - [`BinningError::EmptyExplicitBins`] for empty lists.
    pub fn explicit(tstarts: Vec<f64>, tstops: Vec<f64>) -> BinningResult<Self> {
        if tstarts.len() != tstops.len() {
            return Err(BinningError::LengthMismatch { starts: tstarts.len(), stops: tstops.len() });
        }
        if tstarts.is_empty() {
            return Err(BinningError::EmptyExplicitBins);
        }
        Ok(BinningSpec::Explicit { tstarts, tstops })
    }

    /// Resolve the loose optional configuration into a spec.
    ///
    /// Parameters
    /// ----------
    /// - `nbins`: `Option<usize>`
    ///   Number of uniform bins.
    /// - `tstarts`, `tstops`: `Option<Vec<f64>>`
    ///   Explicit bin edges; must be given together.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::MissingBinning`] when nothing is given.
    /// - [`BinningError::ConflictingBinning`] when `nbins` and any explicit
    ///   edge list are both given.
    /// - [`BinningError::PartialExplicitBins`] when only one edge list is
    ///   given.
    /// - Any error of [`BinningSpec::uniform`] / [`BinningSpec::explicit`].
    pub fn from_parts(
        nbins: Option<usize>, tstarts: Option<Vec<f64>>, tstops: Option<Vec<f64>>,
    ) -> BinningResult<Self> {
        match (nbins, tstarts, tstops) {
            (None, None, None) => Err(BinningError::MissingBinning),
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(BinningError::ConflictingBinning),
            (Some(n), None, None) => Self::uniform(n),
            (None, Some(starts), Some(stops)) => Self::explicit(starts, stops),
            (None, starts, stops) => Err(BinningError::PartialExplicitBins {
                has_starts: starts.is_some(),
                has_stops: stops.is_some(),
            }),
        }
    }

    /// Number of bins this spec will produce.
    pub fn nbins(&self) -> usize {
        match self {
            BinningSpec::Uniform { nbins } => *nbins,
            BinningSpec::Explicit { tstarts, .. } => tstarts.len(),
        }
    }
}

/// TimeBinPlanner — produces the ordered bin list for a [`BinningSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBinPlanner {
    spec: BinningSpec,
}

impl TimeBinPlanner {
    pub fn new(spec: BinningSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &BinningSpec {
        &self.spec
    }

    /// Plan the bins.
    ///
    /// Parameters
    /// ----------
    /// - `span_source`: `&S`
    ///   Provider of the observation span; only consulted for uniform
    ///   binning.
    ///
    /// Returns
    /// -------
    /// `BinningResult<Vec<TimeBin>>`
    ///   Bins in chronological (uniform) or caller (explicit) order.
    ///
    /// Errors
    /// ------
    /// - Errors from `span_source.time_range()`.
    /// - [`BinningError::DegenerateBin`] / [`BinningError::NonFiniteTime`]
    ///   for bins that collapse or are malformed.
    pub fn plan<S: TimeRangeProvider + ?Sized>(
        &self, span_source: &S,
    ) -> BinningResult<Vec<TimeBin>> {
        match &self.spec {
            BinningSpec::Uniform { nbins } => {
                let span = span_source.time_range()?;
                uniform_bins(*nbins, &span)
            }
            BinningSpec::Explicit { tstarts, tstops } => explicit_bins(tstarts, tstops),
        }
    }
}

/// Equal-width partition of `span` with whole-second edges.
///
/// Errors
/// ------
/// - [`BinningError::ZeroBins`] when `nbins == 0`.
/// - [`BinningError::DegenerateBin`] when rounding collapses a bin (the span
///   is shorter than about `nbins` seconds).
pub fn uniform_bins(nbins: usize, span: &ObservationSpan) -> BinningResult<Vec<TimeBin>> {
    if nbins == 0 {
        return Err(BinningError::ZeroBins);
    }
    let step = span.duration() / nbins as f64;
    let edges: Vec<f64> = (0..=nbins)
        .map(|k| {
            let edge = if k == nbins { span.latest() } else { span.earliest() + k as f64 * step };
            edge.round_ties_even()
        })
        .collect();
    edges.windows(2).enumerate().map(|(index, w)| TimeBin::checked(index, w[0], w[1])).collect()
}

/// Bins from explicit edges, truncated toward zero to whole seconds.
///
/// Errors
/// ------
/// - [`BinningError::LengthMismatch`] / [`BinningError::EmptyExplicitBins`].
/// - [`BinningError::NonFiniteTime`] / [`BinningError::DegenerateBin`].
pub fn explicit_bins(tstarts: &[f64], tstops: &[f64]) -> BinningResult<Vec<TimeBin>> {
    if tstarts.len() != tstops.len() {
        return Err(BinningError::LengthMismatch { starts: tstarts.len(), stops: tstops.len() });
    }
    if tstarts.is_empty() {
        return Err(BinningError::EmptyExplicitBins);
    }
    tstarts
        .iter()
        .zip(tstops.iter())
        .enumerate()
        .map(|(index, (&start, &stop))| TimeBin::checked(index, start.trunc(), stop.trunc()))
        .collect()
}
