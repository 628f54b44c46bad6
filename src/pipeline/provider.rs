//! pipeline::provider — factories that bind analysis engines to time bins.
use crate::{
    binning::TimeBin,
    fitting::{AnalysisBackend, ParameterSnapshot},
    pipeline::errors::VariabilityResult,
};
use std::path::Path;

/// BackendProvider — a labelled source of [`AnalysisBackend`]s.
///
/// Required
/// --------
/// - `label()`: key of this backend in reports (e.g. `"pointlike"`).
/// - `all_time()`: engine over the full observation, in its initial state.
/// - `bind_interval(bin, seed, workdir)`: engine restricted to `bin`,
///   restored to `seed` (the all-time best fit). Intermediate products go
///   under `workdir`, which the driver removes unless persistence was
///   requested.
pub trait BackendProvider {
    fn label(&self) -> &str;

    fn all_time(&mut self) -> VariabilityResult<Box<dyn AnalysisBackend>>;

    fn bind_interval(
        &mut self, bin: &TimeBin, seed: &ParameterSnapshot, workdir: &Path,
    ) -> VariabilityResult<Box<dyn AnalysisBackend>>;
}
