//! backends::poisson::likelihood — binned Poisson log-likelihood of a
//! power-law model.
//!
//! Purpose
//! -------
//! Expose the model's free parameters as an unconstrained vector `θ` and
//! evaluate `ℓ(θ) = Σ_k [n_k ln μ_k(θ) − μ_k(θ) − ln Γ(n_k + 1)]` for the
//! optimizer.
//!
//! Key behaviors
//! -------------
//! - Normalizations enter through softplus so they stay positive; indices
//!   enter unchanged.
//! - Gradients are analytic for both parameter kinds. Disabling them
//!   (`FitConfig::use_gradient = false`) makes the optimizer fall back to
//!   finite differences.
//!
//! Invariants & assumptions
//! ------------------------
//! - A bin with observed counts and a non-positive prediction is a domain
//!   error ([`OptError::NonPositiveRate`]); empty bins with zero prediction
//!   contribute nothing.
use crate::{
    backends::poisson::{data::CountsSpectrum, model::PowerLawSource},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta, validation::validate_theta_input},
        numerical_stability::transformations::{
            safe_logistic, safe_softplus, safe_softplus_inv,
        },
    },
};
use ndarray::Array1;
use statrs::function::gamma::ln_gamma;

/// Smallest normalization mapped into `θ` space.
const NORM_FLOOR: f64 = 1e-300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Norm,
    Index,
}

/// Position of one free parameter in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeParam {
    pub source: usize,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoissonLikelihood {
    sources: Vec<PowerLawSource>,
    free: Vec<FreeParam>,
    analytic_gradient: bool,
}

impl PoissonLikelihood {
    /// Likelihood over the free parameters of `sources`, taken in model
    /// order with the normalization before the index.
    pub fn new(sources: Vec<PowerLawSource>, analytic_gradient: bool) -> Self {
        let mut free = Vec::new();
        for (source, s) in sources.iter().enumerate() {
            if s.norm_free {
                free.push(FreeParam { source, kind: ParamKind::Norm });
            }
            if s.index_free {
                free.push(FreeParam { source, kind: ParamKind::Index });
            }
        }
        Self { sources, free, analytic_gradient }
    }

    pub fn free_params(&self) -> &[FreeParam] {
        &self.free
    }

    pub fn dim(&self) -> usize {
        self.free.len()
    }

    /// Current free parameter values in `θ` space.
    pub fn theta0(&self) -> Theta {
        self.free
            .iter()
            .map(|p| {
                let s = &self.sources[p.source];
                match p.kind {
                    ParamKind::Norm => safe_softplus_inv(s.norm.max(NORM_FLOOR)),
                    ParamKind::Index => s.index,
                }
            })
            .collect()
    }

    /// Copy of the model with `theta` written into the free parameters.
    pub fn sources_at(&self, theta: &Theta) -> Vec<PowerLawSource> {
        let mut sources = self.sources.clone();
        for (p, &t) in self.free.iter().zip(theta.iter()) {
            let s = &mut sources[p.source];
            match p.kind {
                ParamKind::Norm => s.norm = safe_softplus(t),
                ParamKind::Index => s.index = t,
            }
        }
        sources
    }
}

/// Predicted counts per energy bin.
pub fn predicted_counts(sources: &[PowerLawSource], data: &CountsSpectrum) -> Vec<f64> {
    data.binning
        .bounds()
        .map(|(e1, e2)| {
            let rate: f64 =
                sources.iter().map(|s| s.norm * s.shape_integral(s.index, e1, e2)).sum();
            data.exposure * rate
        })
        .collect()
}

/// Poisson log-likelihood of `data` under `sources`.
///
/// Errors
/// ------
/// - [`OptError::NonPositiveRate`] for a bin with counts but no positive
///   prediction.
pub fn log_likelihood(sources: &[PowerLawSource], data: &CountsSpectrum) -> OptResult<f64> {
    let mu = predicted_counts(sources, data);
    let mut ll = 0.0;
    for (bin, (&n, &m)) in data.counts.iter().zip(mu.iter()).enumerate() {
        if m > 0.0 {
            ll += n * m.ln() - m - ln_gamma(n + 1.0);
        } else if n > 0.0 || !m.is_finite() {
            return Err(OptError::NonPositiveRate { bin, value: m });
        }
    }
    Ok(ll)
}

impl LogLikelihood for PoissonLikelihood {
    type Data = CountsSpectrum;

    fn value(&self, theta: &Theta, data: &CountsSpectrum) -> OptResult<Cost> {
        validate_theta_input(theta, self.dim())?;
        log_likelihood(&self.sources_at(theta), data)
    }

    fn check(&self, theta: &Theta, _data: &CountsSpectrum) -> OptResult<()> {
        validate_theta_input(theta, self.dim())
    }

    /// Chain rule through the predicted counts:
    /// `∂ℓ/∂θ_k = Σ_i (n_i / μ_i − 1) ∂μ_i/∂θ_k`, where a normalization
    /// contributes `exposure · I_{s,i} · σ(θ_k)` (σ the logistic function)
    /// and an index contributes `exposure · N_s · ∂I_{s,i}/∂Γ`.
    fn grad(&self, theta: &Theta, data: &CountsSpectrum) -> OptResult<Grad> {
        if !self.analytic_gradient {
            return Err(OptError::GradientNotImplemented);
        }
        validate_theta_input(theta, self.dim())?;
        let sources = self.sources_at(theta);
        let mu = predicted_counts(&sources, data);
        let mut residual = Vec::with_capacity(mu.len());
        for (bin, (&n, &m)) in data.counts.iter().zip(mu.iter()).enumerate() {
            if m > 0.0 {
                residual.push(n / m - 1.0);
            } else if n > 0.0 || !m.is_finite() {
                return Err(OptError::NonPositiveRate { bin, value: m });
            } else {
                residual.push(-1.0);
            }
        }
        let grad = self
            .free
            .iter()
            .zip(theta.iter())
            .map(|(p, &t)| {
                let s = &sources[p.source];
                let bins = data.binning.bounds().zip(residual.iter());
                match p.kind {
                    ParamKind::Norm => {
                        let d: f64 =
                            bins.map(|((e1, e2), r)| r * s.shape_integral(s.index, e1, e2)).sum();
                        data.exposure * d * safe_logistic(t)
                    }
                    ParamKind::Index => {
                        let d: f64 = bins
                            .map(|((e1, e2), r)| r * s.shape_integral_dindex(s.index, e1, e2))
                            .sum();
                        data.exposure * s.norm * d
                    }
                }
            })
            .collect::<Array1<f64>>();
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backends::poisson::data::EnergyBinning, fitting::SourceRole};
    use approx::assert_relative_eq;
    use finitediff::FiniteDiff;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The likelihood value against a direct Poisson computation.
    // - The analytic gradient against central differences.
    // - Free-parameter layout and the switch to numeric gradients.
    // -------------------------------------------------------------------------

    fn spectrum() -> CountsSpectrum {
        CountsSpectrum {
            binning: EnergyBinning::log_spaced(100.0, 10_000.0, 2).unwrap(),
            counts: vec![40.0, 7.0],
            exposure: 1e4,
        }
    }

    fn model() -> Vec<PowerLawSource> {
        vec![
            PowerLawSource::new("src", SourceRole::Source, 2e-5, 2.0, 100.0)
                .unwrap()
                .with_fixed_index(),
            PowerLawSource::new("bkg", SourceRole::Background, 1e-5, 2.5, 100.0)
                .unwrap()
                .with_fixed_index(),
        ]
    }

    #[test]
    // Purpose
    // -------
    // `ℓ` equals the Poisson log-pmf summed over bins.
    //
    // Given
    // -----
    // - Two bins with 40 and 7 counts under a two-component model.
    //
    // Expect
    // ------
    // - `log_likelihood` matches `Σ n ln μ − μ − ln n!`.
    fn value_matches_direct_poisson_sum() {
        // Arrange
        let data = spectrum();
        let sources = model();
        let mu = predicted_counts(&sources, &data);

        // Act
        let ll = log_likelihood(&sources, &data).unwrap();

        // Assert
        let expected: f64 = data
            .counts
            .iter()
            .zip(mu.iter())
            .map(|(&n, &m)| n * m.ln() - m - ln_gamma(n + 1.0))
            .sum();
        assert_relative_eq!(ll, expected, max_relative = 1e-12);
        assert!(mu.iter().all(|&m| m > 0.0));
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient matches numerics for norms and indices.
    //
    // Given
    // -----
    // - Both norms free; then the source index freed as well.
    //
    // Expect
    // ------
    // - Agreement with central differences to 1e-5 relative.
    fn analytic_gradient_matches_central_differences() {
        let mut with_index = model();
        with_index[0].index_free = true;
        for sources in [model(), with_index] {
            // Arrange
            let data = spectrum();
            let f = PoissonLikelihood::new(sources, true);
            let theta = f.theta0();

            // Act
            let g = f.grad(&theta, &data).unwrap();
            let fd = theta.central_diff(&|t: &Theta| f.value(t, &data).unwrap());

            // Assert
            for (a, b) in g.iter().zip(fd.iter()) {
                assert_relative_eq!(*a, *b, max_relative = 1e-5, epsilon = 1e-6);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The free-parameter layout follows model order, norm before index,
    // and disabled gradients defer to finite differences.
    //
    // Given
    // -----
    // - The source index freed; and a likelihood with gradients disabled.
    //
    // Expect
    // ------
    // - Layout [src.norm, src.index, bkg.norm]; `GradientNotImplemented`.
    fn layout_and_disabled_gradient() {
        // Arrange
        let mut sources = model();
        sources[0].index_free = true;
        let with_index = PoissonLikelihood::new(sources, true);
        let disabled = PoissonLikelihood::new(model(), false);
        let data = spectrum();

        // Act / Assert
        assert_eq!(with_index.dim(), 3);
        assert_eq!(with_index.free_params()[1], FreeParam { source: 0, kind: ParamKind::Index });
        assert_eq!(with_index.free_params()[2], FreeParam { source: 1, kind: ParamKind::Norm });
        assert_eq!(disabled.grad(&disabled.theta0(), &data), Err(OptError::GradientNotImplemented));
    }

    #[test]
    // Purpose
    // -------
    // Counts without a predicted rate are a domain error.
    //
    // Given
    // -----
    // - A model whose only component has zero normalization.
    //
    // Expect
    // ------
    // - `NonPositiveRate` for bin 0.
    fn counts_without_rate_are_rejected() {
        // Arrange
        let mut sources = model();
        sources.truncate(1);
        sources[0].norm = 0.0;

        // Act
        let err = log_likelihood(&sources, &spectrum()).unwrap_err();

        // Assert
        assert_eq!(err, OptError::NonPositiveRate { bin: 0, value: 0.0 });
    }
}
