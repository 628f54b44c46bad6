//! loglik_optimizer::types — numeric aliases and pre-wired solver types.
//!
//! Purpose
//! -------
//! Keep the `ndarray` and Argmin generics used by the likelihood optimizer
//! in one place. Free spectral parameters (normalizations in softplus space,
//! photon indices) are packed into a [`Theta`] vector; everything else in
//! the optimizer is written against these aliases.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` have one entry per free parameter, in the layout
//!   chosen by the likelihood implementation.
//! - `Hessian` is dense and square when used.
//! - `Cost` is the scalar `-ℓ(θ)` handed to Argmin.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` in unconstrained optimizer space.
pub type Theta = Array1<f64>;

/// Gradient vector matching the shape of [`Theta`].
pub type Grad = Array1<f64>;

/// Dense `n × n` matrix of second derivatives.
pub type Hessian = Array2<f64>;

/// Scalar objective handed to Argmin, `c(θ) = -ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver
/// (e.g. `"cost_count"`, `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
