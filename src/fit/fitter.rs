//! Generic model fitting.
//!
//! Given a [`Model`], data `(x, y)`, optional per-point uncertainties `σ` and
//! an optional starting point, we:
//! - run a single Levenberg–Marquardt minimization of the σ-weighted residuals
//! - estimate 1σ parameter errors from the covariance at the solution
//! - report R² and reduced χ² on the unweighted residuals

use levenberg_marquardt::LeastSquaresProblem;
use serde::{Deserialize, Serialize};

use crate::error::HelioError;
use crate::math::{CurveProblem, converged, covariance_from_jacobian, minimize};
use crate::models::Model;

/// Optional inputs to [`fit_model_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FitOptions<'a> {
    /// Per-point 1σ uncertainty in `y`.
    pub sigma: Option<&'a [f64]>,
    /// Starting parameters; all ones when absent.
    pub initial_guess: Option<&'a [f64]>,
    /// Log the fit summary at info level.
    pub verbose: bool,
}

/// Outcome of a single fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: String,
    /// Fitted parameters, in the model's parameter order.
    pub params: Vec<f64>,
    /// One-standard-deviation error per parameter.
    pub errors: Vec<f64>,
    /// `1 − SS_res / SS_tot`.
    pub r_squared: f64,
    /// `SS_res / (n − p)`.
    pub chi_squared: f64,
    /// `y − f(x; params)`.
    pub residuals: Vec<f64>,
    pub n_points: usize,
    /// Residual/Jacobian evaluations used by the optimizer.
    pub evaluations: usize,
    /// Final value of the optimizer objective (½ Σ weighted residual²).
    pub objective: f64,
}

impl FitResult {
    /// Zero when the result holds no more points than parameters.
    pub fn degrees_of_freedom(&self) -> usize {
        self.n_points.saturating_sub(self.params.len())
    }

    /// Evaluate the fitted model on a new domain.
    pub fn predict<M: Model + ?Sized>(&self, model: &M, x: &[f64]) -> Result<Vec<f64>, HelioError> {
        check_param_count(model, &self.params)?;
        Ok(model.eval_all(x, &self.params))
    }
}

/// `y − model(x; params)`, elementwise.
pub fn residuals<M: Model + ?Sized>(model: &M, x: &[f64], y: &[f64], params: &[f64]) -> Result<Vec<f64>, HelioError> {
    if x.len() != y.len() {
        return Err(HelioError::validation(format!(
            "x has {} points but y has {}",
            x.len(),
            y.len()
        )));
    }
    check_param_count(model, params)?;
    Ok(x.iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - model.eval(xi, params))
        .collect())
}

/// Fit `model` to `(x, y)`, see [`fit_model_with`].
pub fn fit_model<M: Model + ?Sized>(
    model: &M,
    x: &[f64],
    y: &[f64],
    sigma: Option<&[f64]>,
    initial_guess: Option<&[f64]>,
) -> Result<FitResult, HelioError> {
    fit_model_with(
        model,
        x,
        y,
        &FitOptions {
            sigma,
            initial_guess,
            verbose: false,
        },
    )
}

pub fn fit_model_with<M: Model + ?Sized>(
    model: &M,
    x: &[f64],
    y: &[f64],
    opts: &FitOptions<'_>,
) -> Result<FitResult, HelioError> {
    validate_inputs(model, x, y, opts)?;

    let p = model.n_params();
    let n = x.len();
    let ones = vec![1.0; p];
    let initial = opts.initial_guess.unwrap_or(ones.as_slice());

    let problem = CurveProblem::new(model, x, y, opts.sigma, initial);
    let (solved, report) = minimize(problem);

    if !converged(&report.termination) {
        return Err(HelioError::Convergence(format!(
            "{} after {} evaluations: {:?}",
            model.name(),
            report.number_of_evaluations,
            report.termination
        )));
    }

    let params = solved.params_slice().to_vec();
    if params.iter().any(|v| !v.is_finite()) {
        return Err(HelioError::Convergence(format!(
            "{} produced non-finite parameters {params:?}",
            model.name()
        )));
    }

    let dof = (n - p) as f64;
    let weighted = solved.residuals().ok_or_else(|| {
        HelioError::Convergence(format!("{} residuals are not finite at the solution", model.name()))
    })?;
    let s_sq = weighted.norm_squared() / dof;
    let errors = parameter_errors(&solved, s_sq, model.name());

    let res = residuals(model, x, y, &params)?;
    let ss_res: f64 = res.iter().map(|r| r * r).sum();
    let y_mean = crate::stats::mean(y);
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();

    let result = FitResult {
        model: model.name().to_string(),
        params,
        errors,
        r_squared: 1.0 - ss_res / ss_tot,
        chi_squared: ss_res / dof,
        residuals: res,
        n_points: n,
        evaluations: report.number_of_evaluations,
        objective: report.objective_function,
    };

    if opts.verbose {
        log::info!("{result}");
    } else {
        log::debug!(
            "fit {}: params={:?} r2={:.6} chi2={:.6e}",
            result.model,
            result.params,
            result.r_squared,
            result.chi_squared
        );
    }

    Ok(result)
}

fn check_param_count<M: Model + ?Sized>(model: &M, params: &[f64]) -> Result<(), HelioError> {
    if params.len() != model.n_params() {
        return Err(HelioError::validation(format!(
            "model {} takes {} parameters, got {}",
            model.name(),
            model.n_params(),
            params.len()
        )));
    }
    Ok(())
}

fn parameter_errors<M: Model + ?Sized>(solved: &CurveProblem<'_, M>, s_sq: f64, name: &str) -> Vec<f64> {
    let p = solved.params_slice().len();
    let Some(jac) = solved.jacobian() else {
        log::warn!("{name}: Jacobian not finite at the solution; parameter errors are undefined");
        return vec![f64::INFINITY; p];
    };
    match covariance_from_jacobian(&jac) {
        Some((cov, rank_deficient)) => {
            if rank_deficient {
                log::warn!("{name}: Jacobian is rank deficient; parameter errors may be unreliable");
            }
            (0..p).map(|i| (cov[(i, i)] * s_sq).sqrt()).collect()
        }
        None => {
            log::warn!("{name}: covariance of the parameters could not be estimated");
            vec![f64::INFINITY; p]
        }
    }
}

fn validate_inputs<M: Model + ?Sized>(model: &M, x: &[f64], y: &[f64], opts: &FitOptions<'_>) -> Result<(), HelioError> {
    let p = model.n_params();
    let n = x.len();

    if p == 0 {
        return Err(HelioError::validation(format!("model {} has no parameters", model.name())));
    }
    if y.len() != n {
        return Err(HelioError::validation(format!("x has {n} points but y has {}", y.len())));
    }
    if n <= p {
        return Err(HelioError::Fit(format!(
            "{n} points cannot constrain {p} parameters of {} (need more points than parameters)",
            model.name()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(HelioError::validation("x and y must be finite"));
    }
    if let Some(sigma) = opts.sigma {
        if sigma.len() != n {
            return Err(HelioError::validation(format!(
                "sigma has {} values for {n} points",
                sigma.len()
            )));
        }
        if sigma.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(HelioError::validation("sigma values must be finite and > 0"));
        }
    }
    if let Some(guess) = opts.initial_guess {
        if guess.len() != p {
            return Err(HelioError::validation(format!(
                "initial guess has {} values, model {} takes {p}",
                guess.len(),
                model.name()
            )));
        }
        if guess.iter().any(|v| !v.is_finite()) {
            return Err(HelioError::validation("initial guess must be finite"));
        }
    }
    Ok(())
}
