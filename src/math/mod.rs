//! Numerical utilities: nonlinear least squares and parameter covariance.

pub mod lsq;

pub use lsq::*;
