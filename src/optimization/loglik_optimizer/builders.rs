//! loglik_optimizer::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Build L-BFGS solvers for spectral likelihood fits without exposing
//! Argmin's generic wiring. Tolerances and memory size come from
//! [`MLEOptions`]; the starting point and iteration cap are applied by the
//! runner.
//!
//! Key behaviors
//! -------------
//! - One builder per supported line search (Hager–Zhang, More–Thuente).
//! - [`configure_lbfgs`] applies the optional gradient and cost tolerances
//!   for any line-search type.
//!
//! Invariants & assumptions
//! ------------------------
//! - History size is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - Argmin rejections of a tolerance surface as [`OptError`] through the
//!   crate's `From<argmin::core::Error>` conversion.
//!
//! Downstream usage
//! ----------------
//! - [`maximize`] dispatches on [`MLEOptions::line_searcher`]; the spectral
//!   backends alternate line searches between retry attempts.
//!
//! [`OptError`]: crate::optimization::errors::OptError
//! [`maximize`]: crate::optimization::loglik_optimizer::maximize
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// build_optimizer_hager_zhang — L-BFGS with Hager–Zhang line search.
///
/// Errors
/// ------
/// - `OptError` when Argmin rejects a configured tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// build_optimizer_more_thuente — L-BFGS with More–Thuente line search.
///
/// Errors
/// ------
/// - `OptError` when Argmin rejects a configured tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// configure_lbfgs — apply optional tolerances to an L-BFGS solver.
///
/// Parameters
/// ----------
/// - `solver`: `LBFGS<L, Theta, Grad, Cost>`
///   Pre-constructed solver with any line-search type `L`.
/// - `opts`: `&MLEOptions`
///   Source of `tols.tol_grad` and `tols.tol_cost`.
///
/// Returns
/// -------
/// `OptResult<LBFGS<L, Theta, Grad, Cost>>`
///   The solver with every present tolerance applied; absent tolerances
///   keep Argmin's defaults.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
