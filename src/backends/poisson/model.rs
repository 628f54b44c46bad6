//! backends::poisson::model — power-law spectral components.
//!
//! Each component has the photon spectrum `dN/dE = N (E / E₀)^(−Γ)` with
//! normalization `N` (ph cm⁻² s⁻¹ MeV⁻¹), index `Γ` and fixed pivot `E₀`.
//! Predicted counts in `[E₁, E₂)` are the exposure times the integral of
//! the spectrum over the bin.
use crate::{
    backends::poisson::errors::{PoissonError, PoissonResult},
    fitting::SourceRole,
};
use serde::{Deserialize, Serialize};

/// Parameter names used in snapshots.
pub const NORM: &str = "norm";
pub const INDEX: &str = "index";

/// `Γ` closer to 1 than this uses the logarithmic integral.
const INDEX_ONE_TOL: f64 = 1e-9;

/// `|1 − Γ|` below which the index derivative uses its series expansion.
const INDEX_SERIES_TOL: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLawSource {
    pub name: String,
    pub role: SourceRole,
    pub norm: f64,
    pub index: f64,
    pub scale: f64,
    pub norm_free: bool,
    pub index_free: bool,
}

impl PowerLawSource {
    /// New component with both parameters free.
    ///
    /// Errors
    /// ------
    /// - [`PoissonError::InvalidScale`] for a non-positive pivot energy.
    pub fn new(
        name: impl Into<String>, role: SourceRole, norm: f64, index: f64, scale: f64,
    ) -> PoissonResult<Self> {
        let name = name.into();
        if !(scale.is_finite() && scale > 0.0) {
            return Err(PoissonError::InvalidScale { source: name, value: scale });
        }
        Ok(Self { name, role, norm, index, scale, norm_free: true, index_free: true })
    }

    /// Builder-style freeze of the photon index.
    pub fn with_fixed_index(mut self) -> Self {
        self.index_free = false;
        self
    }

    /// `∫_{e1}^{e2} (E / E₀)^(−Γ) dE` for the given index.
    pub fn shape_integral(&self, index: f64, e1: f64, e2: f64) -> f64 {
        power_law_integral(index, self.scale, e1, e2)
    }

    /// `∂/∂Γ` of [`PowerLawSource::shape_integral`].
    pub fn shape_integral_dindex(&self, index: f64, e1: f64, e2: f64) -> f64 {
        power_law_integral_dindex(index, self.scale, e1, e2)
    }

    /// Photon flux in `[e1, e2)` at the current parameters.
    pub fn flux(&self, e1: f64, e2: f64) -> f64 {
        self.norm * self.shape_integral(self.index, e1, e2)
    }
}

/// `∫_{e1}^{e2} (E / scale)^(−index) dE`.
pub fn power_law_integral(index: f64, scale: f64, e1: f64, e2: f64) -> f64 {
    let one_minus = 1.0 - index;
    if one_minus.abs() < INDEX_ONE_TOL {
        scale * (e2 / e1).ln()
    } else {
        scale / one_minus * ((e2 / scale).powf(one_minus) - (e1 / scale).powf(one_minus))
    }
}

/// `∂/∂index` of [`power_law_integral`].
///
/// With `a = 1 − index` and `L = ln(E / scale)` the integral is
/// `scale (e^{a L₂} − e^{a L₁}) / a`; near `a = 0` the derivative is
/// evaluated from its Taylor series to avoid cancellation.
pub fn power_law_integral_dindex(index: f64, scale: f64, e1: f64, e2: f64) -> f64 {
    let a = 1.0 - index;
    let (l1, l2) = ((e1 / scale).ln(), (e2 / scale).ln());
    let d_da = if a.abs() < INDEX_SERIES_TOL {
        (l2.powi(2) - l1.powi(2)) / 2.0
            + a * (l2.powi(3) - l1.powi(3)) / 3.0
            + a * a * (l2.powi(4) - l1.powi(4)) / 8.0
    } else {
        let (x1, x2) = ((a * l1).exp(), (a * l2).exp());
        (l2 * x2 - l1 * x1) / a - (x2 - x1) / (a * a)
    };
    -scale * d_da
}
