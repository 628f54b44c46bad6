//! classify — catalog classification of analyzed sources.
//!
//! Purpose
//! -------
//! Label each source with a physical class, a spatial model and a spectral
//! model. [`ClassificationSource::Automatic`] derives the labels from the
//! source's likelihood summary; [`ClassificationSource::Manual`] reads them
//! from a hand-curated table ([`ManualClassifications`]), for which a blank
//! template can be generated. [`compare_classifications`] reports where the
//! two disagree.
//!
//! Conventions
//! -----------
//! - Category names on the wire are the catalog strings (`"Upper_Limit"`,
//!   `"At_Pulsar"`, `"PLSuperExpCutoff"`).
//! - Errors are [`ClassifyError`] via [`ClassifyResult`].

pub mod classifier;
pub mod errors;
pub mod manual;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::classifier::{
    ClassificationSource, Comparison, classify_automatic, compare_classifications,
};
pub use self::errors::{ClassifyError, ClassifyResult};
pub use self::manual::{ManualClassifications, ManualEntry};
pub use self::types::{
    Classification, LikelihoodSummary, SourceClass, SpatialModel, SpectralModel,
};

pub mod prelude {
    pub use super::classifier::{ClassificationSource, compare_classifications};
    pub use super::errors::{ClassifyError, ClassifyResult};
    pub use super::manual::ManualClassifications;
    pub use super::types::{Classification, LikelihoodSummary, SourceClass};
}
