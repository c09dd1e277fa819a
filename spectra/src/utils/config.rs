use crate::error::PayloadError;
use serde::{de::DeserializeOwned, Serialize};
use std::{ffi::OsStr, fs::OpenOptions, path::Path};

/// Build a config struct by reading a yaml file. Every component
/// config in the payload is read through here so they all fail the
/// same way when a file is absent or malformed.
///
/// * `filepath`: path to config.
pub fn read_yaml_config<T, F>(filepath: F) -> Result<T, PayloadError>
where
    T: DeserializeOwned,
    F: AsRef<OsStr>,
{
    let file = Path::new(&filepath);
    if !file.is_file() {
        return Err(PayloadError::ConfigMissing(file.to_path_buf()));
    }
    let config_file = config::Config::builder()
        .add_source(config::File::new(
            &file.to_string_lossy(),
            config::FileFormat::Yaml,
        ))
        .build()?;
    Ok(config_file.try_deserialize::<T>()?)
}

/// Write a config struct out as yaml, replacing any previous contents.
///
/// * `value`: config to serialise.
/// * `filepath`: destination file.
pub fn write_yaml_config<T, F>(value: &T, filepath: F) -> Result<(), PayloadError>
where
    T: Serialize,
    F: AsRef<OsStr>,
{
    let file = Path::new(&filepath);
    let write_error = |reason: String| PayloadError::ConfigWrite {
        path: file.to_path_buf(),
        reason,
    };
    let handle = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file)
        .map_err(|e| write_error(e.to_string()))?;
    serde_yaml::to_writer(handle, value).map_err(|e| write_error(e.to_string()))
}
