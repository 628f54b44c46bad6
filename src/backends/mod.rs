//! backends — concrete analysis engines.
//!
//! Instrument toolchains plug in by implementing
//! [`AnalysisBackend`](crate::fitting::AnalysisBackend) and
//! [`BackendProvider`](crate::pipeline::BackendProvider); [`poisson`] is the
//! self-contained reference implementation.

pub mod poisson;
