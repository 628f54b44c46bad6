//! backends::poisson::data — photon events and binned count spectra.
//!
//! Purpose
//! -------
//! Hold the inputs of the reference Poisson likelihood: an event list with
//! its good-time intervals, a logarithmic energy binning, and the binned
//! counts plus exposure of one time window.
//!
//! Key behaviors
//! -------------
//! - [`EventList`] validates parallel time/energy columns and exposes its
//!   GTI table as a [`TimeRangeProvider`].
//! - [`CountsSpectrum::from_events`] bins the events falling in
//!   `[start, stop)`; the exposure is the effective area times the good
//!   time overlapping the window.
//!
//! Conventions
//! -----------
//! - Times are MET seconds, energies MeV, areas cm², exposures cm²·s.
//! - Energy bins are half-open `[E_k, E_{k+1})`; events outside the
//!   binning range are ignored.
use crate::{
    backends::poisson::errors::{PoissonError, PoissonResult},
    binning::{BinningResult, GoodTimeIntervals, ObservationSpan, TimeRangeProvider},
};
use serde::{Deserialize, Serialize};

/// Photon events of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct EventList {
    times: Vec<f64>,
    energies: Vec<f64>,
    gti: GoodTimeIntervals,
}

impl EventList {
    /// Errors
    /// ------
    /// - [`PoissonError::EventLengthMismatch`] for unequal columns.
    /// - [`PoissonError::NonFiniteEvent`] / [`PoissonError::NonPositiveEnergy`].
    pub fn new(times: Vec<f64>, energies: Vec<f64>, gti: GoodTimeIntervals) -> PoissonResult<Self> {
        if times.len() != energies.len() {
            return Err(PoissonError::EventLengthMismatch {
                times: times.len(),
                energies: energies.len(),
            });
        }
        for (index, (&time, &energy)) in times.iter().zip(energies.iter()).enumerate() {
            if !time.is_finite() || !energy.is_finite() {
                return Err(PoissonError::NonFiniteEvent { index, time, energy });
            }
            if energy <= 0.0 {
                return Err(PoissonError::NonPositiveEnergy { index, energy });
            }
        }
        Ok(Self { times, energies, gti })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn gti(&self) -> &GoodTimeIntervals {
        &self.gti
    }

    /// Energies of the events with `start <= t < stop`.
    pub fn energies_in(&self, start: f64, stop: f64) -> impl Iterator<Item = f64> + '_ {
        self.times
            .iter()
            .zip(self.energies.iter())
            .filter(move |&(&t, _)| start <= t && t < stop)
            .map(|(_, &e)| e)
    }
}

impl TimeRangeProvider for EventList {
    fn time_range(&self) -> BinningResult<ObservationSpan> {
        self.gti.time_range()
    }
}

/// Strictly increasing, positive energy edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyBinning {
    edges: Vec<f64>,
}

impl EnergyBinning {
    /// Errors
    /// ------
    /// - [`PoissonError::TooFewEdges`] for fewer than two edges.
    /// - [`PoissonError::NonIncreasingEdges`] for non-positive, non-finite
    ///   or non-increasing edges.
    pub fn new(edges: Vec<f64>) -> PoissonResult<Self> {
        if edges.len() < 2 {
            return Err(PoissonError::TooFewEdges { found: edges.len() });
        }
        for (index, &edge) in edges.iter().enumerate() {
            let increasing = index == 0 || edge > edges[index - 1];
            if !edge.is_finite() || edge <= 0.0 || !increasing {
                return Err(PoissonError::NonIncreasingEdges { index });
            }
        }
        Ok(Self { edges })
    }

    /// `nbins` logarithmically spaced bins over `[emin, emax]`.
    ///
    /// Errors
    /// ------
    /// - [`PoissonError::InvalidEnergyRange`] unless `0 < emin < emax`.
    /// - [`PoissonError::TooFewEdges`] for `nbins == 0`.
    pub fn log_spaced(emin: f64, emax: f64, nbins: usize) -> PoissonResult<Self> {
        if !(emin > 0.0 && emax > emin && emax.is_finite()) {
            return Err(PoissonError::InvalidEnergyRange { emin, emax });
        }
        if nbins == 0 {
            return Err(PoissonError::TooFewEdges { found: 1 });
        }
        let (lo, hi) = (emin.ln(), emax.ln());
        let step = (hi - lo) / nbins as f64;
        let edges = (0..=nbins)
            .map(|k| match k {
                0 => emin,
                k if k == nbins => emax,
                k => (lo + k as f64 * step).exp(),
            })
            .collect();
        Self::new(edges)
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn nbins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn emin(&self) -> f64 {
        self.edges[0]
    }

    pub fn emax(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Lower and upper edge of every bin.
    pub fn bounds(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.windows(2).map(|w| (w[0], w[1]))
    }

    /// Index of the bin containing `energy`, if any.
    pub fn bin_of(&self, energy: f64) -> Option<usize> {
        if !(energy >= self.emin() && energy < self.emax()) {
            return None;
        }
        Some(self.edges.partition_point(|&edge| edge <= energy) - 1)
    }
}

/// Counts per energy bin and the exposure of one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountsSpectrum {
    pub binning: EnergyBinning,
    pub counts: Vec<f64>,
    pub exposure: f64,
}

impl CountsSpectrum {
    /// Bin the events of `[start, stop)`.
    ///
    /// Errors
    /// ------
    /// - [`PoissonError::InvalidEffectiveArea`] for a non-positive or
    ///   non-finite `area`.
    pub fn from_events(
        events: &EventList, binning: &EnergyBinning, area: f64, start: f64, stop: f64,
    ) -> PoissonResult<Self> {
        if !(area.is_finite() && area > 0.0) {
            return Err(PoissonError::InvalidEffectiveArea { value: area });
        }
        let mut counts = vec![0.0; binning.nbins()];
        for energy in events.energies_in(start, stop) {
            if let Some(k) = binning.bin_of(energy) {
                counts[k] += 1.0;
            }
        }
        let exposure = area * events.gti().overlap(start, stop);
        Ok(Self { binning: binning.clone(), counts, exposure })
    }

    /// Bin every event of the list over its full good time.
    pub fn all_time(events: &EventList, binning: &EnergyBinning, area: f64) -> PoissonResult<Self> {
        Self::from_events(events, binning, area, f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn total_counts(&self) -> f64 {
        self.counts.iter().sum()
    }
}
