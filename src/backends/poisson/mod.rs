//! backends::poisson — reference analysis engine over binned Poisson counts.
//!
//! Purpose
//! -------
//! A small but complete [`AnalysisBackend`](crate::fitting::AnalysisBackend):
//! power-law components folded through a constant effective area, fitted
//! to the counts of one time window by maximizing the Poisson likelihood
//! with the crate's L-BFGS optimizer.
//!
//! Key behaviors
//! -------------
//! - [`data`]: event lists, energy binning, counts spectra.
//! - [`model`]: power-law components and their integrals.
//! - [`likelihood`]: `ℓ(θ)` and its analytic gradient in softplus space.
//! - [`backend`]: the engine itself.
//! - [`provider`]: all-time and per-bin engines for the variability driver.
//!
//! Conventions
//! -----------
//! - Input errors are [`PoissonError`]; inside the fitting protocol they
//!   surface as `FitError::Backend`.

pub mod backend;
pub mod data;
pub mod errors;
pub mod likelihood;
pub mod model;
pub mod provider;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::backend::PoissonBackend;
pub use self::data::{CountsSpectrum, EnergyBinning, EventList};
pub use self::errors::{PoissonError, PoissonResult};
pub use self::likelihood::{PoissonLikelihood, log_likelihood, predicted_counts};
pub use self::model::{INDEX, NORM, PowerLawSource};
pub use self::provider::{COUNTS_FILE, PoissonProvider};

pub mod prelude {
    pub use super::backend::PoissonBackend;
    pub use super::data::{CountsSpectrum, EnergyBinning, EventList};
    pub use super::errors::{PoissonError, PoissonResult};
    pub use super::model::PowerLawSource;
    pub use super::provider::PoissonProvider;
}
