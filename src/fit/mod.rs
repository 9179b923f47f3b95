//! Curve fitting: residuals and the generic least-squares fit.

pub mod fitter;

pub use fitter::*;
