//! Terminal formatting: parameter vectors, legend labels, run summary.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{FitResult, SampleStats};
use crate::report::ModelResiduals;

/// Format a parameter vector like a printed numpy array.
///
/// Fixed-point with 8 decimals, every cell right-aligned to the widest one:
/// `[ -89.47105173 6400.15142172]`.
pub fn format_param_vector(values: &[f64]) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{v:.8}")).collect();
    let width = cells.iter().map(|c| c.len()).max().unwrap_or(0);
    let padded: Vec<String> = cells.iter().map(|c| format!("{c:>width$}")).collect();
    format!("[{}]", padded.join(" "))
}

/// Legend label embedding the fitted parameters, e.g. `fit: a=-89.471, b=6400.151`.
pub fn legend_label(fit: &FitResult) -> String {
    let parts: Vec<String> = fit
        .model
        .kind
        .param_names()
        .iter()
        .zip(fit.model.params.iter())
        .map(|(name, v)| format!("{name}={v:5.3}"))
        .collect();
    format!("fit: {}", parts.join(", "))
}

/// Format the full run summary (sample stats + per-model diagnostics).
pub fn format_run_summary(stats: &SampleStats, fits: &[FitResult]) -> String {
    let mut out = String::new();

    out.push_str("=== dacfit - temperature/DAC calibration fit ===\n");
    out.push_str(&format!(
        "Samples: n={} | x=[{:.2}, {:.2}] °C | y=[{:.1}, {:.1}]\n",
        stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));

    out.push_str("\nModel diagnostics:\n");
    for fit in fits {
        let q = &fit.quality;
        out.push_str(&format!(
            "  {:<8} SSE={:.3} RMSE={:.3} R²={:.6} iters={} evals={} ({})\n",
            fit.model.display_name,
            q.sse,
            q.rmse,
            q.r_squared,
            q.iterations,
            q.evaluations,
            q.termination.describe()
        ));
    }

    for fit in fits {
        out.push_str(&format!("\n{} model parameters:\n", fit.model.display_name));
        for ((name, value), err) in fit
            .model
            .kind
            .param_names()
            .iter()
            .zip(fit.model.params.iter())
            .zip(fit.std_errors.iter())
        {
            out.push_str(&format!("  {name} = {value:>16.8} ± {}\n", fmt_err(*err)));
        }
    }
    out.push('\n');

    out
}

/// Format the per-sample residual table, one column pair per model.
pub fn format_residual_table(residuals: &[ModelResiduals]) -> String {
    let mut out = String::new();
    let Some(first) = residuals.first() else {
        return out;
    };

    let mut header = format!("{:>10} {:>10}", "x", "y_obs");
    let mut rule = format!("{:-<10} {:-<10}", "", "");
    for r in residuals {
        header.push_str(&format!(
            " {:>12} {:>10}",
            format!("{}_fit", r.model.display_name()),
            "resid"
        ));
        rule.push_str(&format!(" {:-<12} {:-<10}", "", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for (i, row) in first.rows.iter().enumerate() {
        let mut line = format!("{:>10.3} {:>10.2}", row.x, row.y_obs);
        for r in residuals {
            if let Some(cell) = r.rows.get(i) {
                line.push_str(&format!(" {:>12.3} {:>10.3}", cell.y_fit, cell.residual));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn fmt_err(v: f64) -> String {
    if v.is_finite() { format!("{v:.8}") } else { "inf".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveModel, FitQuality, ModelKind, Termination};

    fn fit(kind: ModelKind, params: Vec<f64>) -> FitResult {
        let p = params.len();
        FitResult {
            model: CurveModel {
                kind,
                display_name: kind.display_name().to_string(),
                params,
            },
            covariance: vec![vec![0.0; p]; p],
            std_errors: vec![0.5; p],
            quality: FitQuality {
                sse: 1.0,
                rmse: 0.5,
                r_squared: 0.99,
                n: 4,
                iterations: 3,
                evaluations: 4,
                termination: Termination::CostTolerance,
            },
        }
    }

    #[test]
    fn param_vector_aligns_like_numpy() {
        assert_eq!(
            format_param_vector(&[-89.47105173001253, 6400.151421719072]),
            "[ -89.47105173 6400.15142172]"
        );
        assert_eq!(format_param_vector(&[1.0]), "[1.00000000]");
        assert_eq!(format_param_vector(&[]), "[]");
    }

    #[test]
    fn legend_labels_use_three_decimals() {
        let linear = fit(ModelKind::Linear, vec![-89.47105, 6400.15142]);
        assert_eq!(legend_label(&linear), "fit: a=-89.471, b=6400.151");

        let cubic = fit(ModelKind::Cubic, vec![0.0098770, -0.5100368, -84.9035937, 6426.517987]);
        assert_eq!(
            legend_label(&cubic),
            "fit: a=0.010, b=-0.510, c=-84.904, d=6426.518"
        );
    }

    #[test]
    fn summary_lists_every_model_and_parameter() {
        let stats = SampleStats {
            n_points: 4,
            x_min: 0.0,
            x_max: 3.0,
            y_min: 1.0,
            y_max: 4.0,
        };
        let fits = vec![fit(ModelKind::Linear, vec![1.0, 2.0]), fit(ModelKind::Cubic, vec![0.0, 0.0, 1.0, 2.0])];
        let text = format_run_summary(&stats, &fits);

        assert!(text.contains("Samples: n=4"));
        assert!(text.contains("linear model parameters:"));
        assert!(text.contains("cubic model parameters:"));
        assert!(text.contains("  d = "));
        assert!(text.contains("cost reduction below ftol"));
    }
}
