//! Nonlinear least squares glue around the `levenberg-marquardt` solver.
//!
//! The problem minimized is
//!
//! ```text
//! minimize Σ ((f(x_i; p) − y_i) / σ_i)²
//! ```
//!
//! with a forward-difference Jacobian. After convergence the parameter
//! covariance is estimated from the Jacobian at the solution via an SVD
//! pseudo-inverse of `JᵀJ`, dropping singular values below
//! `eps · max(m, n) · s_max`.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, MinimizationReport, TerminationReason};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::models::Model;

pub struct CurveProblem<'a, M: Model + ?Sized> {
    model: &'a M,
    x: &'a [f64],
    y: &'a [f64],
    inv_sigma: Vec<f64>,
    params: DVector<f64>,
}

impl<'a, M: Model + ?Sized> CurveProblem<'a, M> {
    /// `sigma`, when given, must be the same length as `x` and strictly positive.
    pub fn new(model: &'a M, x: &'a [f64], y: &'a [f64], sigma: Option<&[f64]>, initial: &[f64]) -> Self {
        let inv_sigma = match sigma {
            Some(s) => s.iter().map(|v| 1.0 / v).collect(),
            None => vec![1.0; x.len()],
        };
        Self {
            model,
            x,
            y,
            inv_sigma,
            params: DVector::from_column_slice(initial),
        }
    }

    pub fn params_slice(&self) -> &[f64] {
        self.params.as_slice()
    }

    fn weighted_residuals_at(&self, p: &[f64]) -> Option<DVector<f64>> {
        let r = DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(self.y)
                .zip(&self.inv_sigma)
                .map(|((&xi, &yi), &w)| (self.model.eval(xi, p) - yi) * w),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    }
}

impl<M: Model + ?Sized> LeastSquaresProblem<f64, Dyn, Dyn> for CurveProblem<'_, M> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, p: &DVector<f64>) {
        self.params.copy_from(p);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.weighted_residuals_at(self.params.as_slice())
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let base = self.residuals()?;
        let n = self.params.len();
        let mut jac = DMatrix::<f64>::zeros(self.x.len(), n);
        let mut p = self.params.as_slice().to_vec();

        for j in 0..n {
            let orig = p[j];
            let h = f64::EPSILON.sqrt() * orig.abs().max(1.0);
            p[j] = orig + h;
            let shifted = self.weighted_residuals_at(&p)?;
            p[j] = orig;
            jac.set_column(j, &((shifted - &base) / h));
        }
        Some(jac)
    }
}

/// Run Levenberg–Marquardt from the problem's current parameters.
pub fn minimize<M: Model + ?Sized>(problem: CurveProblem<'_, M>) -> (CurveProblem<'_, M>, MinimizationReport<f64>) {
    LevenbergMarquardt::new().minimize(problem)
}

/// Whether the solver stopped at an acceptable minimum.
///
/// Hitting the tolerance floor ("no further improvement possible") counts as
/// converged; running out of evaluations or non-finite residuals does not.
pub fn converged(reason: &TerminationReason) -> bool {
    reason.was_successful() || matches!(reason, TerminationReason::NoImprovementPossible(_))
}

/// `(JᵀJ)⁺` from the SVD of `J`, or `None` when the decomposition fails.
///
/// The second value is true when small singular values were dropped
/// (rank-deficient Jacobian).
pub fn covariance_from_jacobian(jac: &DMatrix<f64>) -> Option<(DMatrix<f64>, bool)> {
    let (m, n) = jac.shape();
    let svd = jac.clone().svd(false, true);
    let v_t = svd.v_t?;

    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let threshold = f64::EPSILON * m.max(n) as f64 * s_max;

    let mut cov = DMatrix::<f64>::zeros(n, n);
    let mut dropped = false;
    for (k, &s) in svd.singular_values.iter().enumerate() {
        if !(s > threshold) {
            dropped = true;
            continue;
        }
        let v = v_t.row(k).transpose();
        cov += (&v * v.transpose()) / (s * s);
    }
    if svd.singular_values.len() < n {
        dropped = true;
    }
    Some((cov, dropped))
}
