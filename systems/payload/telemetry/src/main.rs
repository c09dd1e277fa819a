//! Telemetry binary
use clap::Parser;
use spectra::{components::prelude::*, error::PayloadError};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

/// Arguments required for starting the program from the command line.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the config file for the telemetry reporter.
    #[arg(short, long)]
    filepath: Option<PathBuf>,
}

fn send_frame(args: &Args) -> Result<(), PayloadError> {
    let config = match &args.filepath {
        Some(filepath) => TelemetryConfig::from_file(filepath)?,
        None => TelemetryConfig::default(),
    };
    let mut link = config.open_link()?;
    TelemetryReporter::from_config(&config).report(&mut link)?;
    Ok(())
}

/// Write the failure to `out` regardless of the log filter.
fn report_failure<W: Write>(out: &mut W, error: &PayloadError) {
    let _ = writeln!(out, "telemetry failed: {error}");
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match send_frame(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}
