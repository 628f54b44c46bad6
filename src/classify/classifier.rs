//! classify::classifier — automatic and manual classification strategies.
//!
//! Purpose
//! -------
//! Assign a [`Classification`] to a source, either from its likelihood
//! summary by fixed rules or from a hand-curated table, and compare the two.
//!
//! Key behaviors
//! -------------
//! Automatic rules, with `ts_point = max(TS_point, 0)`,
//! `ts_ext = max(TS_ext − TS_point, 0)`, `ts_cutoff = max(TS_cutoff, 0)`:
//!
//! - `ts_point > 25`:
//!   - `ts_cutoff > 16` → `Pulsar` with `PLSuperExpCutoff`, otherwise
//!     `Confused` with the fitted spectrum (a missing cutoff test counts
//!     as not significant);
//!   - `ts_ext > 16` → `Extended`, otherwise `Point`.
//! - otherwise → `Upper_Limit`, `At_Pulsar`, fitted spectrum.
//!
//! The automatic rules never produce `PWN`; that class is only assigned by
//! hand.
use crate::classify::{
    manual::ManualClassifications,
    types::{Classification, LikelihoodSummary, SourceClass, SpatialModel, SpectralModel},
};
use std::{collections::BTreeMap, fmt};

/// Point-source TS above which a source counts as detected.
pub const DETECTION_TS: f64 = 25.0;
/// TS above which an exponential cutoff (or an extension) is preferred.
pub const CUTOFF_TS: f64 = 16.0;
pub const EXTENSION_TS: f64 = 16.0;

/// Classification strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationSource {
    /// Rules over the likelihood summary.
    Automatic,
    /// Hand-curated table.
    Manual(ManualClassifications),
}

impl ClassificationSource {
    /// Classification of `name`; `None` when a manual table has no complete
    /// entry for it.
    pub fn classify(&self, name: &str, summary: &LikelihoodSummary) -> Option<Classification> {
        match self {
            ClassificationSource::Automatic => Some(classify_automatic(summary)),
            ClassificationSource::Manual(table) => table.classification(name),
        }
    }
}

pub fn classify_automatic(summary: &LikelihoodSummary) -> Classification {
    if summary.point_significance() <= DETECTION_TS {
        return Classification {
            source_class: SourceClass::UpperLimit,
            spatial_model: SpatialModel::AtPulsar,
            spectral_model: summary.spectral_model(),
        };
    }
    let has_cutoff = summary.cutoff_significance().is_some_and(|ts| ts > CUTOFF_TS);
    let (source_class, spectral_model) = if has_cutoff {
        (SourceClass::Pulsar, SpectralModel::PlSuperExpCutoff)
    } else {
        (SourceClass::Confused, summary.spectral_model())
    };
    let spatial_model = if summary.extension_significance() > EXTENSION_TS {
        SpatialModel::Extended
    } else {
        SpatialModel::Point
    };
    Classification { source_class, spatial_model, spectral_model }
}

/// Outcome of comparing the automatic and manual classification of one
/// source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The manual table has no complete entry.
    NoManualClassification,
    /// No likelihood summary is available.
    ResultsMissing,
    Agree(Classification),
    Disagree { automatic: Classification, manual: Classification },
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::NoManualClassification => write!(f, "no manual classification"),
            Comparison::ResultsMissing => write!(f, "results don't exist"),
            Comparison::Agree(_) => write!(f, "classifications agree"),
            Comparison::Disagree { automatic: a, manual: m } => {
                writeln!(f, "classifications do not agree")?;
                writeln!(f, "{:20}{:>20} {:>20}", "", "automatic", "manual")?;
                let rows = [
                    ("spectral model", a.spectral_model.as_str(), m.spectral_model.as_str()),
                    ("spatial model", a.spatial_model.as_str(), m.spatial_model.as_str()),
                    ("source class", a.source_class.as_str(), m.source_class.as_str()),
                ];
                for (k, (field, auto, manual)) in rows.iter().enumerate() {
                    let sep = if k + 1 < rows.len() { "\n" } else { "" };
                    write!(f, "  - {:16}{auto:>20} {manual:>20}{sep}", format!("{field}:"))?;
                }
                Ok(())
            }
        }
    }
}

/// Compare both strategies for every source in the manual table.
///
/// Parameters
/// ----------
/// - `manual`: hand-curated table; its names define the sources compared.
/// - `summaries`: likelihood summaries by source name; sources without one
///   are reported as [`Comparison::ResultsMissing`].
///
/// Returns
/// -------
/// One `(name, Comparison)` per table entry, ordered by name.
pub fn compare_classifications(
    manual: &ManualClassifications, summaries: &BTreeMap<String, LikelihoodSummary>,
) -> Vec<(String, Comparison)> {
    manual
        .names()
        .map(|name| {
            let outcome = match (manual.classification(name), summaries.get(name)) {
                (None, _) => Comparison::NoManualClassification,
                (Some(_), None) => Comparison::ResultsMissing,
                (Some(m), Some(summary)) => {
                    let a = classify_automatic(summary);
                    if a == m {
                        Comparison::Agree(a)
                    } else {
                        Comparison::Disagree { automatic: a, manual: m }
                    }
                }
            };
            log::debug!("{name} - {outcome}");
            (name.to_string(), outcome)
        })
        .collect()
}
