//! classify::manual — hand-curated classification tables.
//!
//! Purpose
//! -------
//! Load, create and query the per-source table an analyst fills in by
//! hand. A blank template lists every source with all three fields unset;
//! only fully filled entries count as classified.
//!
//! Conventions
//! -----------
//! - JSON object keyed by source name; each entry holds `source_class`,
//!   `spatial_model` and `spectral_model`, any of which may be `null`.
use crate::classify::{
    errors::ClassifyResult,
    types::{Classification, SourceClass, SpatialModel, SpectralModel},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a manual table; `None` means not decided yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub source_class: Option<SourceClass>,
    pub spatial_model: Option<SpatialModel>,
    pub spectral_model: Option<SpectralModel>,
}

impl ManualEntry {
    /// The classification, if every field is set.
    pub fn complete(&self) -> Option<Classification> {
        Some(Classification {
            source_class: self.source_class?,
            spatial_model: self.spatial_model?,
            spectral_model: self.spectral_model?,
        })
    }
}

impl From<Classification> for ManualEntry {
    fn from(c: Classification) -> Self {
        Self {
            source_class: Some(c.source_class),
            spatial_model: Some(c.spatial_model),
            spectral_model: Some(c.spectral_model),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualClassifications {
    entries: BTreeMap<String, ManualEntry>,
}

impl ManualClassifications {
    /// Blank table listing `names` with every field unset.
    pub fn template<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names.into_iter().map(|n| (n.into(), ManualEntry::default())).collect();
        Self { entries }
    }

    /// Errors
    /// ------
    /// - [`ClassifyError::Serialization`](crate::classify::ClassifyError::Serialization)
    ///   for malformed JSON or unknown category names.
    pub fn from_json(text: &str) -> ClassifyResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> ClassifyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: ManualEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&ManualEntry> {
        self.entries.get(name)
    }

    /// Complete classification of `name`, if present and filled in.
    pub fn classification(&self, name: &str) -> Option<Classification> {
        self.get(name).and_then(ManualEntry::complete)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::errors::ClassifyError;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Blank templates and partially filled entries.
    // - JSON parsing with catalog names, nulls and bad categories.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A template lists every source, unclassified, and serializes nulls.
    //
    // Given
    // -----
    // - Two source names.
    //
    // Expect
    // ------
    // - Two entries, no classification, `null` fields in JSON.
    fn template_is_blank() {
        // Arrange / Act
        let table = ManualClassifications::template(["PSRJ0034", "PSRJ0534"]);
        let text = table.to_json_pretty().unwrap();

        // Assert
        assert_eq!(table.len(), 2);
        assert_eq!(table.classification("PSRJ0034"), None);
        assert!(text.contains("\"source_class\": null"));
        assert_eq!(ManualClassifications::from_json(&text).unwrap(), table);
    }

    #[test]
    // Purpose
    // -------
    // Only complete entries count as classified.
    //
    // Given
    // -----
    // - One full entry, one with a missing spatial model, one bad class.
    //
    // Expect
    // ------
    // - A classification for the first, none for the second; the bad
    //   category is a serialization error.
    fn from_json_reads_complete_entries_only() {
        // Arrange
        let text = r#"{
            "PSRJ0534": {"source_class": "PWN", "spatial_model": "Extended",
                         "spectral_model": "PowerLaw"},
            "PSRJ1023": {"source_class": "Upper_Limit", "spatial_model": null,
                         "spectral_model": "PowerLaw"}
        }"#;

        // Act
        let table = ManualClassifications::from_json(text).unwrap();

        // Assert
        assert_eq!(
            table.classification("PSRJ0534"),
            Some(Classification {
                source_class: SourceClass::Pwn,
                spatial_model: SpatialModel::Extended,
                spectral_model: SpectralModel::PowerLaw,
            })
        );
        assert_eq!(table.classification("PSRJ1023"), None);
        assert!(table.get("PSRJ1023").is_some());
        assert!(matches!(
            ManualClassifications::from_json(r#"{"X": {"source_class": "Magnetar"}}"#),
            Err(ClassifyError::Serialization { .. })
        ));
    }
}
