//! fitting::snapshot — save and restore backend model state.
//!
//! Purpose
//! -------
//! The per-bin protocol freezes and frees parameters and moves
//! normalizations on a backend that is shared across bins. Every such
//! change must be undone before the next bin. [`ParameterSnapshot`] is the
//! immutable value captured from a backend; [`SnapshotGuard`] captures one
//! on creation and restores it when dropped, so early returns and `?`
//! propagation leave the backend as they found it.
//!
//! Invariants & assumptions
//! ------------------------
//! - A snapshot is only restored into the backend it came from (or one
//!   with the same source/parameter layout).
//! - A failed restore inside `Drop` cannot be propagated; it is logged at
//!   `warn`. Call [`SnapshotGuard::restore_now`] where the error matters.
use crate::fitting::{backend::AnalysisBackend, errors::FitResult};
use std::{
    collections::BTreeMap,
    ops::{Deref, DerefMut},
};

/// Value and free/fixed flag of one model parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterState {
    pub value: f64,
    pub free: bool,
}

/// Immutable copy of every `(source, parameter)` state of a backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot {
    params: BTreeMap<(String, String), ParameterState>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion used by backends when taking a snapshot.
    pub fn with(mut self, source: &str, parameter: &str, state: ParameterState) -> Self {
        self.insert(source, parameter, state);
        self
    }

    pub fn insert(&mut self, source: &str, parameter: &str, state: ParameterState) {
        self.params.insert((source.to_string(), parameter.to_string()), state);
    }

    pub fn get(&self, source: &str, parameter: &str) -> Option<ParameterState> {
        self.params.get(&(source.to_string(), parameter.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate as `(source, parameter, state)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, ParameterState)> + '_ {
        self.params.iter().map(|((s, p), st)| (s.as_str(), p.as_str(), *st))
    }

    /// Names of sources with at least one free parameter.
    pub fn free_sources(&self) -> Vec<String> {
        let mut out: Vec<String> =
            self.params.iter().filter(|(_, st)| st.free).map(|((s, _), _)| s.clone()).collect();
        out.dedup();
        out
    }
}

/// Scoped restore of a backend's parameter state.
///
/// Dereferences to the wrapped backend so the protocol can keep calling
/// backend methods through the guard.
pub struct SnapshotGuard<'a, B: AnalysisBackend + ?Sized> {
    backend: &'a mut B,
    saved: Option<ParameterSnapshot>,
}

impl<'a, B: AnalysisBackend + ?Sized> SnapshotGuard<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        let saved = Some(backend.snapshot());
        Self { backend, saved }
    }

    /// The state that will be restored.
    pub fn saved(&self) -> Option<&ParameterSnapshot> {
        self.saved.as_ref()
    }

    /// Restore immediately and surface any error.
    ///
    /// Errors
    /// ------
    /// - Whatever [`AnalysisBackend::restore`] reports.
    pub fn restore_now(mut self) -> FitResult<()> {
        match self.saved.take() {
            Some(snap) => self.backend.restore(&snap),
            None => Ok(()),
        }
    }
}

impl<B: AnalysisBackend + ?Sized> Deref for SnapshotGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: AnalysisBackend + ?Sized> DerefMut for SnapshotGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: AnalysisBackend + ?Sized> Drop for SnapshotGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(snap) = self.saved.take() {
            if let Err(err) = self.backend.restore(&snap) {
                log::warn!("failed to restore backend state: {err}");
            }
        }
    }
}
