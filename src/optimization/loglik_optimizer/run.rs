//! Execution helper that runs an Argmin solver on a log-likelihood problem
//! and returns an [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;

/// Run an Argmin solver for a log-likelihood problem.
///
/// Parameters
/// ----------
/// - `theta0`: `Theta`
///   Starting point, consumed into the solver state.
/// - `opts`: `&MLEOptions`
///   `tols.max_iter` caps iterations; `verbose` logs the starting point at
///   `debug` level and, with the `obs_slog` feature, attaches a terminal
///   observer.
/// - `problem`: `ArgMinAdapter<'a, F>`
///   The wrapped likelihood and data.
/// - `solver`: `S`
///   A configured solver from the builders module.
///
/// Returns
/// -------
/// `OptResult<OptimOutcome>`
///   Best parameters, best `ℓ(θ̂)`, termination status and counters.
///
/// Errors
/// ------
/// - Argmin runtime errors, including `OptError`s raised by the
///   likelihood, mapped through `From<argmin::core::Error>`.
/// - Validation errors while building the [`OptimOutcome`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let outcome = OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )?;
    log::debug!(
        "optimizer finished: ell = {:.6}, iterations = {}, status = {}",
        outcome.value,
        outcome.iterations,
        outcome.status
    );
    Ok(outcome)
}

fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    log::debug!(
        "init: ell(theta0) = {:.6}{}",
        ll0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
