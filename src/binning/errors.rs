//! binning::errors — configuration errors raised while planning time bins.
//!
//! Purpose
//! -------
//! Collect every way a time-binning request can be malformed into a single
//! enum, [`BinningError`], with a matching result alias. All of these are
//! configuration problems: they are reported before any likelihood fit is
//! attempted and are never retried.
//!
//! Conventions
//! -----------
//! - Times are mission elapsed time (MET) in seconds; payloads carry the
//!   offending values so messages are self-explanatory in logs.
//! - Bin indices in payloads are zero-based positions in the caller's
//!   `tstarts`/`tstops` (or in the uniform partition).

pub type BinningResult<T> = Result<T, BinningError>;

/// BinningError — invalid time-binning configuration.
///
/// Variants
/// --------
/// - `MissingBinning`
///   Neither `nbins` nor explicit `tstarts`/`tstops` were supplied.
/// - `ConflictingBinning`
///   Both `nbins` and explicit edges were supplied.
/// - `PartialExplicitBins`
///   Only one of `tstarts`/`tstops` was supplied.
/// - `LengthMismatch`
///   `tstarts` and `tstops` have different lengths.
/// - `ZeroBins` / `EmptyExplicitBins`
///   A partition with no bins was requested.
/// - `InvalidSpan`
///   The observation span is non-finite or has `earliest >= latest`.
/// - `DegenerateBin`
///   A bin has `start >= stop` (after integer-second rounding or
///   truncation).
/// - `NonFiniteTime`
///   An explicit edge is NaN or infinite.
/// - `EmptySpanList`
///   A span was requested from an empty list of files/intervals.
/// - `GtiLengthMismatch`
///   A good-time-interval table has unequal START/STOP columns.
#[derive(Debug, Clone, PartialEq)]
pub enum BinningError {
    MissingBinning,
    ConflictingBinning,
    PartialExplicitBins { has_starts: bool, has_stops: bool },
    LengthMismatch { starts: usize, stops: usize },
    ZeroBins,
    EmptyExplicitBins,
    InvalidSpan { earliest: f64, latest: f64 },
    DegenerateBin { index: usize, start: f64, stop: f64 },
    NonFiniteTime { index: usize, value: f64 },
    EmptySpanList,
    GtiLengthMismatch { starts: usize, stops: usize },
}

impl std::error::Error for BinningError {}

impl std::fmt::Display for BinningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinningError::MissingBinning => {
                write!(f, "Either nbins or tstarts/tstops must be specified.")
            }
            BinningError::ConflictingBinning => {
                write!(f, "Only one of nbins and tstarts/tstops may be specified.")
            }
            BinningError::PartialExplicitBins { has_starts, has_stops } => {
                write!(
                    f,
                    "tstarts and tstops must be given together \
                     (tstarts given: {has_starts}, tstops given: {has_stops})."
                )
            }
            BinningError::LengthMismatch { starts, stops } => {
                write!(f, "tstarts has {starts} entries but tstops has {stops}.")
            }
            BinningError::ZeroBins => write!(f, "nbins must be at least 1."),
            BinningError::EmptyExplicitBins => {
                write!(f, "tstarts/tstops must contain at least one bin.")
            }
            BinningError::InvalidSpan { earliest, latest } => {
                write!(
                    f,
                    "Invalid observation span [{earliest}, {latest}]: \
                     bounds must be finite with earliest < latest."
                )
            }
            BinningError::DegenerateBin { index, start, stop } => {
                write!(f, "Bin {index} is empty or inverted: start {start} >= stop {stop}.")
            }
            BinningError::NonFiniteTime { index, value } => {
                write!(f, "Bin edge {index} is not finite: {value}.")
            }
            BinningError::EmptySpanList => {
                write!(f, "Cannot compute an observation span from zero intervals.")
            }
            BinningError::GtiLengthMismatch { starts, stops } => {
                write!(f, "GTI table has {starts} START values but {stops} STOP values.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Error messages embed the offending payload.
    //
    // Given
    // -----
    // - A `LengthMismatch` and a `DegenerateBin` error.
    //
    // Expect
    // ------
    // - Rendered messages contain the payload numbers.
    fn display_embeds_payload_values() {
        // Arrange
        let mismatch = BinningError::LengthMismatch { starts: 3, stops: 2 };
        let degenerate = BinningError::DegenerateBin { index: 4, start: 10.0, stop: 10.0 };

        // Act
        let m1 = mismatch.to_string();
        let m2 = degenerate.to_string();

        // Assert
        assert!(m1.contains('3') && m1.contains('2'));
        assert!(m2.contains("Bin 4") && m2.contains("10"));
    }
}
