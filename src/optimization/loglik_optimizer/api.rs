//! High-level entry point for maximizing a [`LogLikelihood`].
//!
//! Selects an L-BFGS solver with the configured line search, wraps the
//! likelihood in an [`ArgMinAdapter`] and delegates to [`run_lbfgs`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` using L-BFGS with the line search in `opts`.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Likelihood implementation.
/// - `theta0`: `Theta`
///   Starting point in unconstrained space.
/// - `data`: `&F::Data`
///   Observations passed through to `value`/`grad`.
/// - `opts`: `&MLEOptions`
///   Tolerances, line search, verbosity, L-BFGS memory.
///
/// Errors
/// ------
/// - Any error from `f.check(theta0, data)`.
/// - Builder errors for rejected tolerances.
/// - Runtime errors from the solver, including likelihood failures.
///
/// Examples
/// --------
/// ```no_run
/// use ndarray::array;
/// use rust_variability::optimization::errors::OptResult;
/// use rust_variability::optimization::loglik_optimizer::{
///     LogLikelihood, MLEOptions, Theta, maximize,
/// };
///
/// struct Quadratic;
/// impl LogLikelihood for Quadratic {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Quadratic, array![0.1, -0.2], &(), &MLEOptions::default())?;
/// println!("theta_hat = {:?}", out.theta_hat);
/// # Ok::<(), rust_variability::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
