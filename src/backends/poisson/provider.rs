//! backends::poisson::provider — binds the Poisson engine to time bins.
//!
//! Purpose
//! -------
//! Turn one event list plus a power-law model template into
//! [`PoissonBackend`]s: one over the full good time, and one per time bin
//! seeded with the all-time best fit.
//!
//! Key behaviors
//! -------------
//! - Each bound interval writes its binned counts to `counts.json` in the
//!   bin's working directory, so kept workspaces can be inspected.
//! - Provider failures are reported as `VariabilityError::Provider` under
//!   this provider's label.
use crate::{
    backends::poisson::{
        backend::PoissonBackend,
        data::{CountsSpectrum, EnergyBinning, EventList},
        errors::PoissonResult,
        model::PowerLawSource,
    },
    binning::TimeBin,
    fitting::{AnalysisBackend, ParameterSnapshot},
    optimization::loglik_optimizer::MLEOptions,
    pipeline::{BackendProvider, VariabilityError, VariabilityResult},
};
use std::path::Path;

/// File name of the per-bin counts written by [`PoissonProvider`].
pub const COUNTS_FILE: &str = "counts.json";

#[derive(Debug, Clone, PartialEq)]
pub struct PoissonProvider {
    label: String,
    events: EventList,
    binning: EnergyBinning,
    area: f64,
    model: Vec<PowerLawSource>,
    mle: MLEOptions,
}

impl PoissonProvider {
    /// Parameters
    /// ----------
    /// - `label`: backend key in reports.
    /// - `events`: photon list with its GTIs.
    /// - `binning`: energy binning of every spectrum.
    /// - `area`: effective area in cm², constant in time and energy.
    /// - `model`: component template; every backend starts from a copy.
    /// - `mle`: optimizer settings.
    ///
    /// Errors
    /// ------
    /// - The validation errors of [`CountsSpectrum::all_time`] and
    ///   [`PoissonBackend::new`], checked once up front.
    pub fn new(
        label: impl Into<String>, events: EventList, binning: EnergyBinning, area: f64,
        model: Vec<PowerLawSource>, mle: MLEOptions,
    ) -> PoissonResult<Self> {
        let data = CountsSpectrum::all_time(&events, &binning, area)?;
        PoissonBackend::new(model.clone(), data, mle.clone())?;
        Ok(Self { label: label.into(), events, binning, area, model, mle })
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    fn backend(&self, data: CountsSpectrum) -> PoissonResult<PoissonBackend> {
        PoissonBackend::new(self.model.clone(), data, self.mle.clone())
    }

    fn provider_error(&self, err: impl std::fmt::Display) -> VariabilityError {
        VariabilityError::Provider { backend: self.label.clone(), text: err.to_string() }
    }
}

impl BackendProvider for PoissonProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn all_time(&mut self) -> VariabilityResult<Box<dyn AnalysisBackend>> {
        let data = CountsSpectrum::all_time(&self.events, &self.binning, self.area)
            .map_err(|e| self.provider_error(e))?;
        log::debug!(
            "{}: all-time spectrum with {} counts, exposure {:.4e}",
            self.label,
            data.total_counts(),
            data.exposure
        );
        let backend = self.backend(data).map_err(|e| self.provider_error(e))?;
        Ok(Box::new(backend))
    }

    fn bind_interval(
        &mut self, bin: &TimeBin, seed: &ParameterSnapshot, workdir: &Path,
    ) -> VariabilityResult<Box<dyn AnalysisBackend>> {
        let (start, stop) = (bin.start(), bin.stop());
        let data = CountsSpectrum::from_events(&self.events, &self.binning, self.area, start, stop)
            .map_err(|e| self.provider_error(e))?;

        let path = workdir.join(COUNTS_FILE);
        let text = serde_json::to_string_pretty(&data)?;
        std::fs::write(&path, text).map_err(|e| VariabilityError::io(&path, e))?;

        let mut backend = self.backend(data).map_err(|e| self.provider_error(e))?;
        backend.restore(seed).map_err(|e| self.provider_error(e))?;
        Ok(Box::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{binning::GoodTimeIntervals, fitting::SourceRole};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Event selection per bound interval and the counts file.
    // - Seeding from a snapshot and error labelling.
    // -------------------------------------------------------------------------

    fn provider() -> PoissonProvider {
        let gti = GoodTimeIntervals::new(vec![0.0, 60.0], vec![40.0, 100.0]).unwrap();
        let times = vec![1.0, 10.0, 30.0, 65.0, 70.0, 99.0];
        let energies = vec![150.0, 300.0, 2_000.0, 500.0, 50_000.0, 120.0];
        let events = EventList::new(times, energies, gti).unwrap();
        let binning = EnergyBinning::log_spaced(100.0, 1e5, 3).unwrap();
        let model = vec![
            PowerLawSource::new("src", SourceRole::Source, 1e-3, 2.0, 100.0).unwrap(),
            PowerLawSource::new("bkg", SourceRole::Background, 1e-3, 2.5, 100.0).unwrap(),
        ];
        PoissonProvider::new("poisson", events, binning, 10.0, model, MLEOptions::default())
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A bound interval sees only its events and records them on disk.
    //
    // Given
    // -----
    // - Six events; a bin [0, 50) holding three of them, with 40 s of good
    //   time.
    //
    // Expect
    // ------
    // - counts.json with 3 counts in total and exposure 10 × 40.
    fn bind_interval_bins_events_and_writes_counts() {
        // Arrange
        let mut p = provider();
        let dir = tempfile::tempdir().unwrap();
        let bin = TimeBin::new(0.0, 50.0).unwrap();

        // Act
        let seed = p.all_time().unwrap().snapshot();
        p.bind_interval(&bin, &seed, dir.path()).unwrap();
        let text = std::fs::read_to_string(dir.path().join(COUNTS_FILE)).unwrap();
        let written: CountsSpectrum = serde_json::from_str(&text).unwrap();

        // Assert
        assert_eq!(written.total_counts(), 3.0);
        assert_eq!(written.counts, vec![2.0, 1.0, 0.0]);
        assert_eq!(written.exposure, 400.0);
    }

    #[test]
    // Purpose
    // -------
    // Bound backends start from the seed, not the template.
    //
    // Given
    // -----
    // - A seed with a modified source normalization.
    //
    // Expect
    // ------
    // - The bound backend reports the seeded normalization.
    fn bind_interval_restores_seed() {
        // Arrange
        let mut p = provider();
        let dir = tempfile::tempdir().unwrap();
        let mut all = p.all_time().unwrap();
        all.set_normalization("src", 7e-4).unwrap();
        let seed = all.snapshot();

        // Act
        let bin = TimeBin::new(50.0, 100.0).unwrap();
        let bound = p.bind_interval(&bin, &seed, dir.path()).unwrap();

        // Assert
        assert_eq!(bound.normalization("src").unwrap(), 7e-4);
        assert_eq!(bound.snapshot(), seed);
    }

    #[test]
    // Purpose
    // -------
    // Seeds naming foreign sources are provider errors under this label.
    //
    // Given
    // -----
    // - A snapshot mentioning an unknown component.
    //
    // Expect
    // ------
    // - `VariabilityError::Provider { backend: "poisson", .. }`.
    fn foreign_seed_is_a_provider_error() {
        // Arrange
        let mut p = provider();
        let dir = tempfile::tempdir().unwrap();
        let seed = ParameterSnapshot::new().with(
            "ghost",
            "norm",
            crate::fitting::ParameterState { value: 1.0, free: true },
        );

        // Act
        let err = p.bind_interval(&TimeBin::new(0.0, 50.0).unwrap(), &seed, dir.path());

        // Assert
        assert!(matches!(
            err,
            Err(VariabilityError::Provider { backend, .. }) if backend == "poisson"
        ));
    }
}
