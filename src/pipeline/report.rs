//! pipeline::report — results of a variability run and their persisted form.
//!
//! Purpose
//! -------
//! [`VariabilityReport`] holds everything computed for one backend;
//! [`VariabilityRun`] groups the reports of all backends over a common set
//! of bins. [`PersistedResults`] is the serde mapping written to disk:
//!
//! ```text
//! name, min_ts,
//! time:     {starts: [..], stops: [..]},
//! bands:    [{tstart, tstop, days,
//!             <backend>: {ll_0, ll_1, flux: {flux, flux_err}, TS, upper_limit}}],
//! all_time: {<backend>: {flux: {flux, flux_err}, TS}},
//! TS_var:   {<backend>: ..},
//! sigma:    {<backend>: ..}
//! ```
//!
//! Conventions
//! -----------
//! - JSON has no NaN: undefined fluxes, flux errors and TS values are
//!   written as `null` and read back as NaN.
//! - Backend sub-mappings are keyed by provider label and ordered by label.
use crate::{
    binning::TimeBin,
    fitting::{AllTimeFit, BinFitResult, UpperLimit},
    pipeline::errors::{VariabilityError, VariabilityResult},
    statistics::{BinContribution, SigmaOutcome},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

/// Variability result for one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct VariabilityReport {
    pub backend: String,
    pub all_time: AllTimeFit,
    pub bins: Vec<BinFitResult>,
    pub contributions: Vec<BinContribution>,
    pub ts_var: f64,
    pub significance: SigmaOutcome,
}

impl VariabilityReport {
    pub fn sigma(&self) -> f64 {
        self.significance.sigma
    }
}

/// Reports of every backend over one bin list.
#[derive(Debug, Clone, PartialEq)]
pub struct VariabilityRun {
    pub name: String,
    pub min_ts: f64,
    pub bins: Vec<TimeBin>,
    pub reports: Vec<VariabilityReport>,
}

impl VariabilityRun {
    pub fn report(&self, backend: &str) -> Option<&VariabilityReport> {
        self.reports.iter().find(|r| r.backend == backend)
    }

    pub fn backends(&self) -> impl Iterator<Item = &str> + '_ {
        self.reports.iter().map(|r| r.backend.as_str())
    }

    pub fn to_persisted(&self) -> PersistedResults {
        let bands = self
            .bins
            .iter()
            .enumerate()
            .map(|(k, bin)| PersistedBand {
                tstart: bin.start(),
                tstop: bin.stop(),
                days: bin.duration_days(),
                fits: self
                    .reports
                    .iter()
                    .filter_map(|r| r.bins.get(k).map(|b| (r.backend.clone(), b.into())))
                    .collect(),
            })
            .collect();
        let per_backend = |f: &dyn Fn(&VariabilityReport) -> f64| -> BTreeMap<String, f64> {
            self.reports.iter().map(|r| (r.backend.clone(), f(r))).collect()
        };
        PersistedResults {
            name: self.name.clone(),
            min_ts: self.min_ts,
            time: PersistedTime {
                starts: self.bins.iter().map(TimeBin::start).collect(),
                stops: self.bins.iter().map(TimeBin::stop).collect(),
            },
            bands,
            all_time: self
                .reports
                .iter()
                .map(|r| {
                    let AllTimeFit { flux, flux_err, test_statistic } = r.all_time;
                    let fit =
                        PersistedAllTime { flux: PersistedFlux { flux, flux_err }, test_statistic };
                    (r.backend.clone(), fit)
                })
                .collect(),
            ts_var: per_backend(&|r| r.ts_var),
            sigma: per_backend(&|r| r.sigma()),
        }
    }

    /// Errors
    /// ------
    /// - [`VariabilityError::Serialization`] if serialization fails.
    pub fn to_json_pretty(&self) -> VariabilityResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_persisted())?)
    }

    /// Write the persisted mapping as pretty JSON.
    ///
    /// Errors
    /// ------
    /// - [`VariabilityError::Io`] / [`VariabilityError::Serialization`].
    pub fn write_json(&self, path: &Path) -> VariabilityResult<()> {
        let text = self.to_json_pretty()?;
        std::fs::write(path, text).map_err(|e| VariabilityError::io(path, e))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedResults {
    pub name: String,
    pub min_ts: f64,
    pub time: PersistedTime,
    pub bands: Vec<PersistedBand>,
    pub all_time: BTreeMap<String, PersistedAllTime>,
    #[serde(rename = "TS_var")]
    pub ts_var: BTreeMap<String, f64>,
    pub sigma: BTreeMap<String, f64>,
}

impl PersistedResults {
    /// Errors
    /// ------
    /// - [`VariabilityError::Serialization`] for malformed input.
    pub fn from_json(text: &str) -> VariabilityResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTime {
    pub starts: Vec<f64>,
    pub stops: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBand {
    pub tstart: f64,
    pub tstop: f64,
    pub days: f64,
    #[serde(flatten)]
    pub fits: BTreeMap<String, PersistedBinFit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBinFit {
    pub ll_0: f64,
    pub ll_1: f64,
    pub flux: PersistedFlux,
    #[serde(rename = "TS", with = "nan_as_null")]
    pub test_statistic: f64,
    pub upper_limit: Option<UpperLimit>,
}

impl From<&BinFitResult> for PersistedBinFit {
    fn from(b: &BinFitResult) -> Self {
        Self {
            ll_0: b.ll_frozen,
            ll_1: b.ll_free,
            flux: PersistedFlux { flux: b.flux, flux_err: b.flux_err },
            test_statistic: b.test_statistic,
            upper_limit: b.upper_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedFlux {
    #[serde(with = "nan_as_null")]
    pub flux: f64,
    #[serde(with = "nan_as_null")]
    pub flux_err: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedAllTime {
    pub flux: PersistedFlux,
    #[serde(rename = "TS", with = "nan_as_null")]
    pub test_statistic: f64,
}

/// Non-finite floats as `null`, `null` as NaN.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
