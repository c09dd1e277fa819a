use std::{io, path::PathBuf, process::ExitStatus};
use thiserror::Error;

/// The main error enum for the payload, consolidating errors from all modules.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("shot counter: {0}")]
    Counter(#[from] CounterError),

    #[error("device: {0}")]
    Device(#[from] DeviceError),

    #[error("failed to append to activity log {path:?}: {source}")]
    ActivityLog { path: PathBuf, source: io::Error },

    #[error("archive: {0}")]
    Archive(#[from] ArchiveError),

    #[error("telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("could not locate the config file {0:?}")]
    ConfigMissing(PathBuf),

    #[error("failed to read config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to write config {path:?}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },
}

/// Errors related to the persistent shot counter file.
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("failed to access {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("{path:?} does not hold a serial number, found {contents:?}")]
    Corrupt { path: PathBuf, contents: String },
    #[error("{path:?} has reached the largest serial number")]
    Exhausted { path: PathBuf },
}

/// Errors raised by hardware handles.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("GPIO {pin} via {path:?}: {source}")]
    Gpio {
        pin: u32,
        path: PathBuf,
        source: io::Error,
    },
    #[error("LED strip {device:?}: {source}")]
    LedStrip { device: PathBuf, source: io::Error },
    #[error("camera command is empty")]
    EmptyCommand,
    #[error("failed to launch {program}: {source}")]
    CommandLaunch { program: String, source: io::Error },
    #[error("{program} exited with {status}")]
    CommandStatus { program: String, status: ExitStatus },
    #[error("no thermal component labelled {label:?}")]
    ThermalMissing { label: String },
    #[error("thermal component {label:?} returned {value}")]
    ThermalReading { label: String, value: f32 },
}

/// Errors raised while packaging the run outputs.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to create {path:?}: {source}")]
    Create { path: PathBuf, source: io::Error },
    #[error("failed to add {path:?}: {source}")]
    Entry { path: PathBuf, source: io::Error },
    #[error("failed to finish {path:?}: {source}")]
    Finish { path: PathBuf, source: io::Error },
}

/// Errors raised while assembling or sending a telemetry frame.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("{field} value {value} does not fit its frame field")]
    FieldOverflow { field: &'static str, value: i64 },
    #[error("failed to read uptime {path:?}: {source}")]
    Uptime { path: PathBuf, source: io::Error },
    #[error("uptime file {path:?} holds {contents:?}")]
    UptimeParse { path: PathBuf, contents: String },
    #[error("sensor: {0}")]
    Sensor(#[from] DeviceError),
    #[error("failed to open serial link {path:?}: {source}")]
    LinkOpen {
        path: PathBuf,
        source: serialport::Error,
    },
    #[error("failed to write to serial link: {0}")]
    Link(#[source] io::Error),
}
