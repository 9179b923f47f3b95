//! Closed-form model functions.
//!
//! Each model exists in two forms:
//! - an elementwise function over a domain slice (`gaussian(&x, ...)`)
//! - a [`ModelKind`] variant implementing [`Model`], which is what the fitter
//!   consumes
//!
//! Numeric edge cases (e.g. a negative base with a fractional power-law
//! exponent) propagate as NaN/inf rather than erroring.

use serde::{Deserialize, Serialize};

/// A scalar model `y = f(x; params)` with a fixed parameter count.
pub trait Model {
    fn name(&self) -> &str;

    fn n_params(&self) -> usize;

    /// Evaluate at one point.
    ///
    /// # Panics
    /// May panic if `params.len() != self.n_params()`.
    fn eval(&self, x: f64, params: &[f64]) -> f64;

    fn eval_all(&self, x: &[f64], params: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.eval(xi, params)).collect()
    }
}

impl<M: Model + ?Sized> Model for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn n_params(&self) -> usize {
        (**self).n_params()
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        (**self).eval(x, params)
    }
}

/// The built-in models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// `avg^x · e^(−x) / x!`
    Poisson,
    /// `amp · exp(−½((x − mean)/sigma)²) + c`
    Gaussian,
    /// Two Gaussians sharing one offset.
    DoubleGaussian,
    /// `slope · x + intercept`
    Linear,
    /// `a · x^b`
    PowerLaw,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Poisson,
        ModelKind::Gaussian,
        ModelKind::DoubleGaussian,
        ModelKind::Linear,
        ModelKind::PowerLaw,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Poisson => "poisson",
            ModelKind::Gaussian => "gaussian",
            ModelKind::DoubleGaussian => "double_gaussian",
            ModelKind::Linear => "linear",
            ModelKind::PowerLaw => "power_law",
        }
    }

    /// Parameter names in fit order.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Poisson => &["avg"],
            ModelKind::Gaussian => &["amp", "mean", "sigma", "c"],
            ModelKind::DoubleGaussian => &["amp1", "mean1", "sigma1", "amp2", "mean2", "sigma2", "c"],
            ModelKind::Linear => &["slope", "intercept"],
            ModelKind::PowerLaw => &["a", "b"],
        }
    }
}

impl Model for ModelKind {
    fn name(&self) -> &str {
        self.display_name()
    }

    fn n_params(&self) -> usize {
        self.param_names().len()
    }

    fn eval(&self, x: f64, p: &[f64]) -> f64 {
        match self {
            ModelKind::Poisson => poisson_at(x, p[0]),
            ModelKind::Gaussian => gaussian_at(x, p[0], p[1], p[2], p[3]),
            ModelKind::DoubleGaussian => {
                gaussian_at(x, p[0], p[1], p[2], 0.0) + gaussian_at(x, p[3], p[4], p[5], 0.0) + p[6]
            }
            ModelKind::Linear => p[0] * x + p[1],
            ModelKind::PowerLaw => p[0] * x.powf(p[1]),
        }
    }
}

/// Adapter turning any closure into a [`Model`].
pub struct FnModel<F> {
    name: String,
    n_params: usize,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    pub fn new(name: impl Into<String>, n_params: usize, f: F) -> Self {
        Self {
            name: name.into(),
            n_params,
            f,
        }
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn n_params(&self) -> usize {
        self.n_params
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        (self.f)(x, params)
    }
}

/// `x!`, exact for small non-negative integers and `Γ(x + 1)` otherwise.
pub fn factorial(x: f64) -> f64 {
    if x >= 0.0 && x.fract() == 0.0 && x <= 170.0 {
        (1..=x as u32).fold(1.0, |acc, k| acc * k as f64)
    } else {
        libm::tgamma(x + 1.0)
    }
}

fn poisson_at(x: f64, avg: f64) -> f64 {
    avg.powf(x) * (-x).exp() / factorial(x)
}

fn gaussian_at(x: f64, amp: f64, mean: f64, sigma: f64, c: f64) -> f64 {
    let z = (x - mean) / sigma;
    amp * (-0.5 * z * z).exp() + c
}

pub fn poisson(x: &[f64], avg: f64) -> Vec<f64> {
    x.iter().map(|&xi| poisson_at(xi, avg)).collect()
}

pub fn gaussian(x: &[f64], amp: f64, mean: f64, sigma: f64, c: f64) -> Vec<f64> {
    ModelKind::Gaussian.eval_all(x, &[amp, mean, sigma, c])
}

#[allow(clippy::too_many_arguments)]
pub fn double_gaussian(
    x: &[f64],
    amp1: f64,
    mean1: f64,
    sigma1: f64,
    amp2: f64,
    mean2: f64,
    sigma2: f64,
    c: f64,
) -> Vec<f64> {
    ModelKind::DoubleGaussian.eval_all(x, &[amp1, mean1, sigma1, amp2, mean2, sigma2, c])
}

pub fn linear(x: &[f64], slope: f64, intercept: f64) -> Vec<f64> {
    ModelKind::Linear.eval_all(x, &[slope, intercept])
}

pub fn power_law(x: &[f64], a: f64, b: f64) -> Vec<f64> {
    ModelKind::PowerLaw.eval_all(x, &[a, b])
}
