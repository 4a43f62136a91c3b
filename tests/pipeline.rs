use std::io::Write;

use approx::assert_relative_eq;
use dac_calibration::app::pipeline::{run_fit, run_from_file};
use dac_calibration::domain::{FitConfig, ModelKind, ModelSpec, SampleSource, SyntheticSpec};
use dac_calibration::error::{EXIT_FIT, EXIT_IO, EXIT_SAMPLES};
use dac_calibration::io::{read_fit_json, write_fit_json, write_residuals_csv};
use dac_calibration::plot::render_svg_chart;
use dac_calibration::report::format_param_vector;

#[test]
fn default_run_fits_builtin_samples() {
    let run = run_fit(&FitConfig::default()).unwrap();

    assert_eq!(run.stats.n_points, 11);
    assert_eq!(run.fits.len(), 2);
    assert_eq!(run.fits[0].model.kind, ModelKind::Linear);
    assert_eq!(run.fits[1].model.kind, ModelKind::Cubic);

    let linear = &run.fits[0].model.params;
    assert_relative_eq!(linear[0], -89.47105173001253, max_relative = 1e-6);
    assert_relative_eq!(linear[1], 6400.151421719072, max_relative = 1e-6);

    let cubic = &run.fits[1].model.params;
    assert_relative_eq!(cubic[0], 0.00987700500117476, max_relative = 1e-4);
    assert_relative_eq!(cubic[1], -0.5100367811771226, max_relative = 1e-4);
    assert_relative_eq!(cubic[2], -84.90359374248321, max_relative = 1e-5);
    assert_relative_eq!(cubic[3], 6426.51798677445, max_relative = 1e-6);

    // Dense grid spans -20..40 and is wider than the sample domain.
    for grid in &run.grids {
        assert_eq!(grid.x.len(), 100);
        assert_eq!(grid.x[0], -20.0);
        assert_eq!(grid.x[99], 40.0);
    }
    assert_eq!(run.chart.curves.len(), 2);
    assert_eq!(run.chart.samples.len(), 11);
}

#[test]
fn parameter_lines_print_like_numpy_arrays() {
    let run = run_fit(&FitConfig::default()).unwrap();
    let line = format_param_vector(&run.fits[0].model.params);
    assert!(line.starts_with("[ -89.471"), "{line}");
    assert!(line.ends_with(']'));
    assert_eq!(line.split_whitespace().count(), 3);
}

#[test]
fn repeated_runs_are_identical() {
    let a = run_fit(&FitConfig::default()).unwrap();
    let b = run_fit(&FitConfig::default()).unwrap();
    for (x, y) in a.fits.iter().zip(b.fits.iter()) {
        assert_eq!(x.model.params, y.model.params);
    }
}

#[test]
fn synthetic_linear_samples_are_recovered() {
    let config = FitConfig {
        source: SampleSource::Synthetic(SyntheticSpec {
            coeffs: vec![3.0, 7.0],
            points: 21,
            x_from: -5.0,
            x_to: 15.0,
            noise: 0.0,
            seed: 1,
        }),
        model_spec: ModelSpec::Linear,
        ..FitConfig::default()
    };
    let run = run_fit(&config).unwrap();
    assert_eq!(run.fits.len(), 1);
    assert_relative_eq!(run.fits[0].model.params[0], 3.0, epsilon = 1e-6);
    assert_relative_eq!(run.fits[0].model.params[1], 7.0, epsilon = 1e-6);
    assert!(run.residuals[0].rows.iter().all(|r| r.residual.abs() < 1e-6));
}

#[test]
fn csv_samples_flow_through_fit_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("samples.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "temperature,dac").unwrap();
    for (x, y) in [(-8, 7080), (0, 6400), (10, 5560), (20, 4620), (30, 3680), (40, 2860)] {
        writeln!(file, "{x},{y}").unwrap();
    }
    drop(file);

    let config = FitConfig {
        source: SampleSource::Csv(csv_path),
        ..FitConfig::default()
    };
    let run = run_fit(&config).unwrap();
    assert_eq!(run.stats.n_points, 6);

    let json_path = dir.path().join("fit.json");
    let residual_path = dir.path().join("residuals.csv");
    write_fit_json(&json_path, &run.samples, &run.fits, &run.grids).unwrap();
    write_residuals_csv(&residual_path, &run.fits, &run.residuals).unwrap();

    let text = std::fs::read_to_string(&residual_path).unwrap();
    // Header plus six rows per model.
    assert_eq!(text.lines().count(), 1 + 2 * 6);

    // A saved fit re-plots without refitting.
    let replay = run_from_file(read_fit_json(&json_path).unwrap()).unwrap();
    assert_eq!(replay.fits.len(), 2);
    for (got, want) in replay.fits[1].model.params.iter().zip(run.fits[1].model.params.iter()) {
        assert_relative_eq!(*got, *want, max_relative = 1e-12);
    }
    assert_eq!(replay.chart.curves.len(), 2);
    assert_eq!(replay.chart.samples.len(), 6);

    let svg_path = dir.path().join("chart.svg");
    render_svg_chart(&replay.chart, &svg_path, (800, 600)).unwrap();
    assert!(std::fs::read_to_string(&svg_path).unwrap().contains("<svg"));
}

#[test]
fn saved_fit_with_wrong_parameter_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("fit.json");
    let run = run_fit(&FitConfig::default()).unwrap();
    write_fit_json(&json_path, &run.samples, &run.fits, &run.grids).unwrap();

    let mut doc = read_fit_json(&json_path).unwrap();
    doc.fits[1].fit.model.params.truncate(2);

    let err = run_from_file(doc).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_IO);
    assert!(err.message().contains("cubic"), "{}", err.message());
}

#[test]
fn missing_csv_is_an_io_error() {
    let config = FitConfig {
        source: SampleSource::Csv("/definitely/not/here.csv".into()),
        ..FitConfig::default()
    };
    assert_eq!(run_fit(&config).unwrap_err().exit_code(), EXIT_IO);
}

#[test]
fn empty_synthetic_set_is_rejected() {
    let config = FitConfig {
        source: SampleSource::Synthetic(SyntheticSpec {
            coeffs: vec![1.0],
            points: 0,
            x_from: 0.0,
            x_to: 1.0,
            noise: 0.0,
            seed: 0,
        }),
        ..FitConfig::default()
    };
    assert_eq!(run_fit(&config).unwrap_err().exit_code(), EXIT_SAMPLES);
}

#[test]
fn starved_solver_terminates_the_run() {
    let config = FitConfig {
        max_iters: Some(1),
        ..FitConfig::default()
    };
    assert_eq!(run_fit(&config).unwrap_err().exit_code(), EXIT_FIT);
}
