//! Capture sequence binary
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
    /// Prefix for the image filenames and the archive.
    #[arg(default_value = DEFAULT_OUTPUT_PREFIX)]
    output_prefix: String,
    /// Path to the config file for the capture run. Built in defaults are
    /// used when omitted.
    #[arg(short, long)]
    filepath: Option<PathBuf>,
}

/// Write the failure to `out` regardless of the log filter.
fn report_failure<W: Write>(out: &mut W, error: &PayloadError) {
    let _ = writeln!(out, "capture run failed: {error}");
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let component = match &args.filepath {
        Some(filepath) => CaptureRun::from_config_file(filepath),
        None => CaptureRun::from_config(&CaptureRunConfig::default()),
    };
    match component.and_then(|mut run| run.execute(&args.output_prefix)) {
        Ok(report) => {
            println!("All files are in TAR {}", report.archive.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}
