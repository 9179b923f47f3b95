//! Plain-text formatting for fit results and binned summaries.
//!
//! Formatting lives here so the fitting and binning code only produce numbers.

use std::fmt;

use crate::fit::FitResult;
use crate::models::ModelKind;
use crate::stats::{BinnedTable, DistanceSummary};

/// Parameter names for a fitted model, `p0..pn` when the model is not built in.
fn param_labels(result: &FitResult) -> Vec<String> {
    match ModelKind::ALL.iter().find(|k| k.display_name() == result.model) {
        Some(kind) if kind.param_names().len() == result.params.len() => {
            kind.param_names().iter().map(|s| s.to_string()).collect()
        }
        _ => (0..result.params.len()).map(|i| format!("p{i}")).collect(),
    }
}

/// Multi-line summary: parameters with their 1σ errors, R² and reduced χ².
pub fn format_fit_summary(result: &FitResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Fit of {} (n={}, dof={})\n",
        result.model,
        result.n_points,
        result.degrees_of_freedom()
    ));
    out.push_str("Fit parameters:\n");
    for (label, (value, err)) in param_labels(result)
        .iter()
        .zip(result.params.iter().zip(&result.errors))
    {
        out.push_str(&format!("  {label:<10} = {value:>14.6e} +/- {err:.3e}\n"));
    }
    out.push_str(&format!("R-squared  : {:.6}\n", result.r_squared));
    out.push_str(&format!("Chi-squared: {:.6e}\n", result.chi_squared));

    out
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_fit_summary(self).trim_end())
    }
}

/// One row per distance bin, one column per variable.
pub fn format_binned_table(table: &BinnedTable) -> String {
    let mut out = String::new();

    let mut header = format!("{:<14}", "distance_au");
    for name in &table.columns {
        header.push_str(&format!(" {:>14}", truncate(name, 14)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (bin, row) in table.bins.iter().zip(&table.values) {
        let close = if bin.upper >= 1.0 { ']' } else { ')' };
        let mut line = format!("{:<14}", format!("[{:.2}, {:.2}{close}", bin.lower, bin.upper));
        for v in row {
            line.push_str(&format!(" {v:>14.4}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Medians, standard deviations and per-bin counts.
pub fn format_distance_summary(summary: &DistanceSummary) -> String {
    let mut out = String::new();

    out.push_str("Median per distance bin:\n");
    out.push_str(&format_binned_table(&summary.median));
    out.push_str("\nStandard deviation per distance bin:\n");
    out.push_str(&format_binned_table(&summary.std));
    out.push_str(&format!("\nRows per bin: {:?}\n", summary.counts));
    if summary.dropped > 0 {
        out.push_str(&format!("Rows outside [0, 1] AU or without distance: {}\n", summary.dropped));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DistanceBin;

    fn sample_fit() -> FitResult {
        FitResult {
            model: "linear".to_string(),
            params: vec![3.0, 2.0],
            errors: vec![0.1, 0.2],
            r_squared: 0.99,
            chi_squared: 0.5,
            residuals: vec![0.0; 5],
            n_points: 5,
            evaluations: 4,
            objective: 0.0,
        }
    }

    #[test]
    fn summary_names_builtin_parameters() {
        let s = format_fit_summary(&sample_fit());
        assert!(s.contains("Fit of linear (n=5, dof=3)"));
        assert!(s.contains("slope"));
        assert!(s.contains("intercept"));
        assert!(s.contains("R-squared  : 0.990000"));
        assert!(s.contains("Chi-squared"));
    }

    #[test]
    fn custom_models_get_positional_labels() {
        let mut fit = sample_fit();
        fit.model = "custom".to_string();
        let s = fit.to_string();
        assert!(s.contains("p0"));
        assert!(s.contains("p1"));
        assert!(!s.ends_with('\n'));
    }

    #[test]
    fn binned_table_has_one_line_per_bin() {
        let table = BinnedTable {
            bins: vec![
                DistanceBin { index: 0, lower: 0.0, upper: 0.5 },
                DistanceBin { index: 1, lower: 0.5, upper: 1.0 },
            ],
            columns: vec!["Np".to_string(), "a_very_long_column_name".to_string()],
            values: vec![vec![1.0, 2.0], vec![f64::NAN, 4.0]],
        };
        let s = format_binned_table(&table);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("a_very_long_c."));
        assert!(lines[1].starts_with("[0.00, 0.50)"));
        assert!(lines[2].starts_with("[0.50, 1.00]"));
        assert!(lines[2].contains("NaN"));
    }
}
