//! classify::types — categories assigned to a source and the likelihood
//! summary they are derived from.
//!
//! Conventions
//! -----------
//! - Serialized names are the catalog strings (`"Upper_Limit"`,
//!   `"At_Pulsar"`, `"PLSuperExpCutoff"`, ...), which are also what
//!   `Display` prints.
use crate::classify::errors::{ClassifyError, ClassifyResult};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Physical interpretation of the emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceClass {
    /// Magnetospheric emission.
    Pulsar,
    /// Pulsar wind nebula.
    #[serde(rename = "PWN")]
    Pwn,
    Confused,
    #[serde(rename = "Upper_Limit")]
    UpperLimit,
}

impl SourceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceClass::Pulsar => "Pulsar",
            SourceClass::Pwn => "PWN",
            SourceClass::Confused => "Confused",
            SourceClass::UpperLimit => "Upper_Limit",
        }
    }

    /// Single-letter catalog code: M(agnetospheric), (W)ind, C, U.
    pub fn abbreviation(&self) -> char {
        match self {
            SourceClass::Pulsar => 'M',
            SourceClass::Pwn => 'W',
            SourceClass::Confused => 'C',
            SourceClass::UpperLimit => 'U',
        }
    }

    /// Whether the source was detected (every class but `Upper_Limit`).
    pub fn is_detected(&self) -> bool {
        !matches!(self, SourceClass::UpperLimit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialModel {
    #[serde(rename = "At_Pulsar")]
    AtPulsar,
    Point,
    Extended,
}

impl SpatialModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpatialModel::AtPulsar => "At_Pulsar",
            SpatialModel::Point => "Point",
            SpatialModel::Extended => "Extended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpectralModel {
    FileFunction,
    PowerLaw,
    #[serde(rename = "PLSuperExpCutoff")]
    PlSuperExpCutoff,
}

impl SpectralModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectralModel::FileFunction => "FileFunction",
            SpectralModel::PowerLaw => "PowerLaw",
            SpectralModel::PlSuperExpCutoff => "PLSuperExpCutoff",
        }
    }
}

impl FromStr for SpectralModel {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FileFunction" => Ok(SpectralModel::FileFunction),
            "PowerLaw" => Ok(SpectralModel::PowerLaw),
            "PLSuperExpCutoff" => Ok(SpectralModel::PlSuperExpCutoff),
            other => Err(ClassifyError::UnknownSpectralModel { name: other.to_string() }),
        }
    }
}

impl fmt::Display for SourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for SpatialModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for SpectralModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Complete classification of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub source_class: SourceClass,
    pub spatial_model: SpatialModel,
    pub spectral_model: SpectralModel,
}

/// Likelihood results a classification is based on.
///
/// Fields
/// ------
/// - `ts_point`: TS of the point-source hypothesis, nuisances reoptimized.
/// - `ts_extended`: TS of the extended hypothesis, nuisances reoptimized.
/// - `ts_cutoff`: TS of the exponential cutoff over a pure power law;
///   `None` when the cutoff test was not run.
/// - `spectral_model`: spectrum used by both spatial hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodSummary {
    ts_point: f64,
    ts_extended: f64,
    ts_cutoff: Option<f64>,
    spectral_model: SpectralModel,
}

impl LikelihoodSummary {
    /// Errors
    /// ------
    /// - [`ClassifyError::NonFiniteTs`] for a NaN or infinite TS.
    pub fn new(
        ts_point: f64, ts_extended: f64, ts_cutoff: Option<f64>, spectral_model: SpectralModel,
    ) -> ClassifyResult<Self> {
        check_finite("ts_point", ts_point)?;
        check_finite("ts_extended", ts_extended)?;
        if let Some(value) = ts_cutoff {
            check_finite("ts_cutoff", value)?;
        }
        Ok(Self { ts_point, ts_extended, ts_cutoff, spectral_model })
    }

    /// Like [`LikelihoodSummary::new`], taking the spectrum names reported
    /// by the point and extended fits.
    ///
    /// Errors
    /// ------
    /// - [`ClassifyError::UnknownSpectralModel`] for an unrecognized name.
    /// - [`ClassifyError::SpectralMismatch`] when the names differ.
    pub fn from_fits(
        ts_point: f64, ts_extended: f64, ts_cutoff: Option<f64>, point_spectrum: &str,
        extended_spectrum: &str,
    ) -> ClassifyResult<Self> {
        if point_spectrum != extended_spectrum {
            return Err(ClassifyError::SpectralMismatch {
                point: point_spectrum.to_string(),
                extended: extended_spectrum.to_string(),
            });
        }
        Self::new(ts_point, ts_extended, ts_cutoff, point_spectrum.parse()?)
    }

    /// `max(TS_point, 0)`.
    pub fn point_significance(&self) -> f64 {
        self.ts_point.max(0.0)
    }

    /// `max(TS_ext − TS_point, 0)`.
    pub fn extension_significance(&self) -> f64 {
        (self.ts_extended - self.ts_point).max(0.0)
    }

    /// `max(TS_cutoff, 0)` when the cutoff test was run.
    pub fn cutoff_significance(&self) -> Option<f64> {
        self.ts_cutoff.map(|ts| ts.max(0.0))
    }

    pub fn spectral_model(&self) -> SpectralModel {
        self.spectral_model
    }
}

fn check_finite(field: &'static str, value: f64) -> ClassifyResult<()> {
    if value.is_finite() { Ok(()) } else { Err(ClassifyError::NonFiniteTs { field, value }) }
}
