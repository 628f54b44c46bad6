//! binning::span — observation spans and good-time-interval tables.
//!
//! Purpose
//! -------
//! Describe the time coverage of an observation. A uniform time partition
//! needs the `[earliest, latest]` envelope of all event files; this module
//! provides that envelope ([`ObservationSpan`]), the per-file START/STOP
//! tables it is derived from ([`GoodTimeIntervals`]), and the
//! [`TimeRangeProvider`] seam through which the planner asks for it.
//!
//! Key behaviors
//! -------------
//! - The span of a single file is `(min START, max STOP)` of its GTIs.
//! - The span of several files is the union: global minimum of starts and
//!   global maximum of stops (files need not overlap).
//! - GTI tables can report their livetime overlap with an arbitrary window,
//!   which exposure calculations use.
//!
//! Invariants & assumptions
//! ------------------------
//! - An [`ObservationSpan`] always has finite bounds with
//!   `earliest < latest`.
//! - GTI rows are individually ordered (`start <= stop`) but rows may be
//!   unsorted relative to each other.
use serde::{Deserialize, Serialize};

use crate::binning::errors::{BinningError, BinningResult};

/// Closed envelope `[earliest, latest]` of an observation in MET seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpan {
    earliest: f64,
    latest: f64,
}

impl ObservationSpan {
    /// Build a validated span.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::InvalidSpan`] when either bound is non-finite or
    ///   `earliest >= latest`.
    pub fn new(earliest: f64, latest: f64) -> BinningResult<Self> {
        if !earliest.is_finite() || !latest.is_finite() || earliest >= latest {
            return Err(BinningError::InvalidSpan { earliest, latest });
        }
        Ok(Self { earliest, latest })
    }

    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    pub fn latest(&self) -> f64 {
        self.latest
    }

    pub fn duration(&self) -> f64 {
        self.latest - self.earliest
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(&self, other: &ObservationSpan) -> ObservationSpan {
        ObservationSpan {
            earliest: self.earliest.min(other.earliest),
            latest: self.latest.max(other.latest),
        }
    }

    /// Union of an arbitrary collection of spans.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::EmptySpanList`] if `spans` yields nothing.
    pub fn union_all<'a, I>(spans: I) -> BinningResult<ObservationSpan>
    where
        I: IntoIterator<Item = &'a ObservationSpan>,
    {
        spans.into_iter().fold(None, |acc: Option<ObservationSpan>, span| match acc {
            Some(acc) => Some(acc.union(span)),
            None => Some(*span),
        })
        .ok_or(BinningError::EmptySpanList)
    }
}

/// Source of the observation span consulted by uniform binning.
///
/// Implemented by single spans, GTI tables, and slices/vectors of any
/// provider (one entry per event file), in which case the union is taken.
pub trait TimeRangeProvider {
    fn time_range(&self) -> BinningResult<ObservationSpan>;
}

impl TimeRangeProvider for ObservationSpan {
    fn time_range(&self) -> BinningResult<ObservationSpan> {
        Ok(*self)
    }
}

impl<T: TimeRangeProvider> TimeRangeProvider for [T] {
    fn time_range(&self) -> BinningResult<ObservationSpan> {
        let spans = self.iter().map(|p| p.time_range()).collect::<BinningResult<Vec<_>>>()?;
        ObservationSpan::union_all(spans.iter())
    }
}

impl<T: TimeRangeProvider> TimeRangeProvider for Vec<T> {
    fn time_range(&self) -> BinningResult<ObservationSpan> {
        self.as_slice().time_range()
    }
}

/// GoodTimeIntervals — START/STOP table of one event file.
///
/// Invariants
/// ----------
/// - `starts.len() == stops.len()`.
/// - Every row is finite with `start <= stop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodTimeIntervals {
    starts: Vec<f64>,
    stops: Vec<f64>,
}

impl GoodTimeIntervals {
    /// Build a validated GTI table.
    ///
    /// Errors
    /// ------
    /// - [`BinningError::GtiLengthMismatch`] for unequal columns.
    /// - [`BinningError::NonFiniteTime`] for NaN/infinite entries.
    /// - [`BinningError::DegenerateBin`] when a row has `start > stop`.
    pub fn new(starts: Vec<f64>, stops: Vec<f64>) -> BinningResult<Self> {
        if starts.len() != stops.len() {
            let (starts, stops) = (starts.len(), stops.len());
            return Err(BinningError::GtiLengthMismatch { starts, stops });
        }
        for (index, (&start, &stop)) in starts.iter().zip(stops.iter()).enumerate() {
            if !start.is_finite() {
                return Err(BinningError::NonFiniteTime { index, value: start });
            }
            if !stop.is_finite() {
                return Err(BinningError::NonFiniteTime { index, value: stop });
            }
            if start > stop {
                return Err(BinningError::DegenerateBin { index, start, stop });
            }
        }
        Ok(Self { starts, stops })
    }

    /// Single interval covering `[start, stop]`.
    pub fn single(start: f64, stop: f64) -> BinningResult<Self> {
        Self::new(vec![start], vec![stop])
    }

    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    pub fn stops(&self) -> &[f64] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.starts.iter().copied().zip(self.stops.iter().copied())
    }

    /// Total livetime in seconds.
    pub fn livetime(&self) -> f64 {
        self.iter().map(|(start, stop)| stop - start).sum()
    }

    /// Seconds of good time falling inside `[start, stop)`.
    pub fn overlap(&self, start: f64, stop: f64) -> f64 {
        self.iter().map(|(a, b)| (b.min(stop) - a.max(start)).max(0.0)).sum()
    }

    /// Whether `t` lies inside any good-time row.
    pub fn contains(&self, t: f64) -> bool {
        self.iter().any(|(a, b)| a <= t && t <= b)
    }
}

impl TimeRangeProvider for GoodTimeIntervals {
    fn time_range(&self) -> BinningResult<ObservationSpan> {
        if self.is_empty() {
            return Err(BinningError::EmptySpanList);
        }
        let earliest = self.starts.iter().copied().fold(f64::INFINITY, f64::min);
        let latest = self.stops.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        ObservationSpan::new(earliest, latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Span validation and union semantics across several files.
    // - GTI table validation, envelope, livetime and window overlap.
    //
    // They intentionally DO NOT cover:
    // - Bin planning on top of spans (see `planner`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The span of several files is the min of starts and max of stops.
    //
    // Given
    // -----
    // - Two GTI tables whose rows interleave and do not overlap.
    //
    // Expect
    // ------
    // - The union span is [100, 900].
    fn union_across_files_uses_global_min_and_max() {
        // Arrange
        let file_a = GoodTimeIntervals::new(vec![300.0, 100.0], vec![400.0, 200.0]).unwrap();
        let file_b = GoodTimeIntervals::new(vec![500.0], vec![900.0]).unwrap();
        let files = vec![file_a, file_b];

        // Act
        let span = files.time_range().unwrap();

        // Assert
        assert_eq!(span.earliest(), 100.0);
        assert_eq!(span.latest(), 900.0);
    }

    #[test]
    // Purpose
    // -------
    // An empty list of files cannot produce a span.
    //
    // Given
    // -----
    // - An empty vector of GTI tables.
    //
    // Expect
    // ------
    // - `EmptySpanList`.
    fn empty_file_list_is_rejected() {
        // Arrange
        let files: Vec<GoodTimeIntervals> = Vec::new();

        // Act
        let result = files.time_range();

        // Assert
        assert_eq!(result, Err(BinningError::EmptySpanList));
    }

    #[test]
    // Purpose
    // -------
    // Spans must be finite and strictly increasing.
    //
    // Given
    // -----
    // - Inverted, zero-length and NaN bounds.
    //
    // Expect
    // ------
    // - All are rejected with `InvalidSpan`.
    fn invalid_spans_are_rejected() {
        // Arrange / Act / Assert
        assert!(matches!(ObservationSpan::new(10.0, 5.0), Err(BinningError::InvalidSpan { .. })));
        assert!(matches!(ObservationSpan::new(5.0, 5.0), Err(BinningError::InvalidSpan { .. })));
        assert!(matches!(
            ObservationSpan::new(f64::NAN, 5.0),
            Err(BinningError::InvalidSpan { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Overlap with a window only counts good time inside the window.
    //
    // Given
    // -----
    // - GTIs [0, 100] and [200, 300]; window [50, 250).
    //
    // Expect
    // ------
    // - 50 s from the first row plus 50 s from the second.
    fn overlap_clips_each_row_to_the_window() {
        // Arrange
        let gti = GoodTimeIntervals::new(vec![0.0, 200.0], vec![100.0, 300.0]).unwrap();

        // Act
        let overlap = gti.overlap(50.0, 250.0);

        // Assert
        assert_eq!(overlap, 100.0);
        assert_eq!(gti.livetime(), 200.0);
        assert!(gti.contains(250.0));
        assert!(!gti.contains(150.0));
    }

    #[test]
    // Purpose
    // -------
    // GTI tables reject malformed rows.
    //
    // Given
    // -----
    // - Unequal columns and a row with start > stop.
    //
    // Expect
    // ------
    // - `GtiLengthMismatch` and `DegenerateBin` respectively.
    fn malformed_gti_tables_are_rejected() {
        // Arrange / Act
        let mismatch = GoodTimeIntervals::new(vec![0.0, 1.0], vec![2.0]);
        let inverted = GoodTimeIntervals::new(vec![5.0], vec![1.0]);

        // Assert
        assert_eq!(mismatch, Err(BinningError::GtiLengthMismatch { starts: 2, stops: 1 }));
        assert!(matches!(inverted, Err(BinningError::DegenerateBin { index: 0, .. })));
    }
}
