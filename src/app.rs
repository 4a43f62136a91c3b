//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - runs the fit pipeline
//! - prints parameters, reports and charts
//! - writes optional exports

use std::io::IsTerminal;

use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Command, FitArgs, PlotArgs, ShowArgs, SolverArgs, SourceArgs};
use crate::domain::{FitConfig, SampleSource, SyntheticSpec};
use crate::error::AppError;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `dacfit` binary.
pub fn run() -> Result<(), AppError> {
    // We want `dacfit` and `dacfit --data f.csv` to behave like `dacfit show ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    setup_logging(cli.verbose);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries results.
fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    // A subscriber may already be installed when embedded (e.g. in tests).
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args.source, &args.solver);
    let run = pipeline::run_fit(&config)?;
    print_params(&run);

    if !std::io::stdout().is_terminal() {
        warn!("stdout is not a terminal; printing an ASCII chart instead");
        println!(
            "{}",
            crate::plot::render_ascii_chart(&run.chart, config.plot_width, config.plot_height)
        );
        return Ok(());
    }

    crate::tui::run(&run)
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let mut config = fit_config_from_args(&args.source, &args.solver);
    config.plot = !args.no_plot;
    config.plot_width = args.width;
    config.plot_height = args.height;
    config.export_json = args.export_json.clone();
    config.export_csv = args.export_csv.clone();

    let run = pipeline::run_fit(&config)?;
    print_params(&run);

    println!();
    println!("{}", crate::report::format_run_summary(&run.stats, &run.fits));
    println!("{}", crate::report::format_residual_table(&run.residuals));

    if config.plot {
        let plot = crate::plot::render_ascii_chart(&run.chart, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::write_fit_json(path, &run.samples, &run.fits, &run.grids)?;
        info!(path = %path.display(), "wrote fit JSON");
    }
    if let Some(path) = &config.export_csv {
        crate::io::write_residuals_csv(path, &run.fits, &run.residuals)?;
        info!(path = %path.display(), "wrote residual CSV");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let run = match &args.from {
        Some(path) => pipeline::run_from_file(crate::io::read_fit_json(path)?)?,
        None => pipeline::run_fit(&fit_config_from_args(&args.source, &args.solver))?,
    };
    print_params(&run);

    crate::plot::render_svg_chart(&run.chart, &args.out, (args.width, args.height))?;
    println!("Wrote {}", args.out.display());
    Ok(())
}

/// One parameter vector per line, in model order.
fn print_params(run: &RunOutput) {
    for fit in &run.fits {
        println!("{}", crate::report::format_param_vector(&fit.model.params));
    }
}

pub fn fit_config_from_args(source: &SourceArgs, solver: &SolverArgs) -> FitConfig {
    let source = match (&source.data, &source.synthetic) {
        (Some(path), _) => SampleSource::Csv(path.clone()),
        (None, Some(coeffs)) => SampleSource::Synthetic(SyntheticSpec {
            coeffs: coeffs.clone(),
            points: source.points,
            x_from: source.x_from,
            x_to: source.x_to,
            noise: source.noise,
            seed: source.seed,
        }),
        (None, None) => SampleSource::Builtin,
    };

    FitConfig {
        source,
        model_spec: solver.model,
        max_iters: solver.max_iters,
        ftol: solver.ftol,
        xtol: solver.xtol,
        gtol: solver.gtol,
        grid_x_min: solver.x_min,
        grid_x_max: solver.x_max,
        grid_points: solver.grid_points,
        ..FitConfig::default()
    }
}

/// Rewrite argv so `dacfit` defaults to `dacfit show`.
///
/// Rules:
/// - `dacfit`                      -> `dacfit show`
/// - `dacfit --data f.csv ...`     -> `dacfit show --data f.csv ...`
/// - `dacfit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("show".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "fit" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "show flags".
    if arg1.starts_with('-') {
        argv.insert(1, "show".to_string());
        return argv;
    }

    argv
}
