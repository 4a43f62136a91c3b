//! `dac-calibration` library crate.
//!
//! The binary (`dacfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit, report and chart code can be reused outside the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
