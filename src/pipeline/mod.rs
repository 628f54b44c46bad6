//! pipeline — the variability test driver and its persisted results.
//!
//! Purpose
//! -------
//! Tie binning, per-bin fitting and statistics together across one or more
//! analysis backends ([`VariabilityTester`]), manage per-bin working
//! directories ([`Workspace`]), and map results to the on-disk layout
//! ([`PersistedResults`]).
//!
//! Conventions
//! -----------
//! - Backends are supplied through [`BackendProvider`] and keyed by label.
//! - Errors are [`VariabilityError`] via [`VariabilityResult`].

pub mod errors;
pub mod options;
pub mod provider;
pub mod report;
pub mod runner;
pub mod workspace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{VariabilityError, VariabilityResult};
pub use self::options::VariabilityOptions;
pub use self::provider::BackendProvider;
pub use self::report::{PersistedResults, VariabilityReport, VariabilityRun};
pub use self::runner::VariabilityTester;
pub use self::workspace::{BinDir, Workspace};

pub mod prelude {
    pub use super::errors::{VariabilityError, VariabilityResult};
    pub use super::options::VariabilityOptions;
    pub use super::provider::BackendProvider;
    pub use super::report::{VariabilityReport, VariabilityRun};
    pub use super::runner::VariabilityTester;
}
