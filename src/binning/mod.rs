//! binning — time-bin planning for variability analyses.
//!
//! Purpose
//! -------
//! Partition an observation into the sub-intervals that are fitted
//! independently. Uniform partitions need the observation span, which is
//! obtained through [`TimeRangeProvider`] (typically one GTI table per event
//! file); explicit partitions are taken as given.
//!
//! Key behaviors
//! -------------
//! - [`BinningSpec`] captures the choice between uniform and explicit bins
//!   and rejects conflicting or partial configuration before any fitting.
//! - [`TimeBinPlanner`] turns a spec into an ordered `Vec<TimeBin>`.
//! - [`ObservationSpan`] / [`GoodTimeIntervals`] model the time coverage of
//!   one or many event files.
//!
//! Conventions
//! -----------
//! - All times are MET seconds; bins are half-open `[start, stop)`.
//! - Errors are reported as [`BinningError`] via [`BinningResult`].

pub mod errors;
pub mod planner;
pub mod span;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{BinningError, BinningResult};
pub use self::planner::{BinningSpec, SECONDS_PER_DAY, TimeBin, TimeBinPlanner};
pub use self::span::{GoodTimeIntervals, ObservationSpan, TimeRangeProvider};

pub mod prelude {
    pub use super::errors::{BinningError, BinningResult};
    pub use super::planner::{BinningSpec, TimeBin, TimeBinPlanner};
    pub use super::span::{GoodTimeIntervals, ObservationSpan, TimeRangeProvider};
}
