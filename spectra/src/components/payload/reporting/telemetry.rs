use crate::{
    devices::hardware::sensors::{CpuSensors, HostCpuSensors, SensorConfig},
    error::{PayloadError, TelemetryError},
    messages::payload::telemetry::TelemetryFrame,
    utils::config::{read_yaml_config, write_yaml_config},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serialport::SerialPort;
use std::{ffi::OsStr, fs, io::Write, path::PathBuf, time::Duration};
use uuid::Uuid;

/// Default name of the uptime file maintained alongside the payload.
pub const UPTIME_FILE: &str = "uptime.txt";
/// Line speed of the link to the host, 8N1 framing.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// How long a frame write may block before it is abandoned.
const LINK_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the telemetry reporter.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
pub struct TelemetryConfig {
    /// Plain text file holding the uptime as an integer.
    pub uptime_file: PathBuf,
    /// Serial device carrying the frames to the host.
    pub serial_device: PathBuf,
    /// Line speed of the serial link.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Where the CPU readings are taken from.
    #[serde(default)]
    pub sensors: SensorConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            uptime_file: PathBuf::from(UPTIME_FILE),
            serial_device: PathBuf::from("/dev/serial0"),
            baud_rate: DEFAULT_BAUD_RATE,
            sensors: SensorConfig::default(),
        }
    }
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl TelemetryConfig {
    /// Build the config by reading a file.
    ///
    /// * `filepath`: path to config.
    pub fn from_file<F: AsRef<OsStr>>(filepath: F) -> Result<Self, PayloadError> {
        read_yaml_config(filepath)
    }

    /// Write the config to a file.
    ///
    /// * `filepath`: destination file.
    pub fn to_file<F: AsRef<OsStr>>(&self, filepath: F) -> Result<(), PayloadError> {
        write_yaml_config(self, filepath)
    }

    /// Open the serial device at `baud_rate`, 8 data bits, no parity,
    /// one stop bit and no flow control.
    pub fn open_link(&self) -> Result<Box<dyn SerialPort>, TelemetryError> {
        debug!(
            "opening serial link {:?} at {} baud",
            self.serial_device, self.baud_rate
        );
        serialport::new(self.serial_device.to_string_lossy(), self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(LINK_TIMEOUT)
            .open()
            .map_err(|source| TelemetryError::LinkOpen {
                path: self.serial_device.clone(),
                source,
            })
    }
}

/// Reads the CPU health and uptime and sends them as one frame. Not part
/// of the capture run; the host polls it separately.
pub struct TelemetryReporter<S> {
    /// Unique id of the reporter.
    uuid: Uuid,
    sensors: S,
    uptime_file: PathBuf,
}

impl TelemetryReporter<HostCpuSensors> {
    /// Reporter reading the sensors described by `config`.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(
            HostCpuSensors::new(config.sensors.clone()),
            config.uptime_file.clone(),
        )
    }
}

impl<S: CpuSensors> TelemetryReporter<S> {
    /// * `sensors`: CPU temperature and load source.
    /// * `uptime_file`: file holding the uptime.
    pub fn new(sensors: S, uptime_file: PathBuf) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            sensors,
            uptime_file,
        }
    }

    /// Return the unique id of the reporter.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }

    /// Take the readings and build a frame without sending it.
    pub fn sample(&self) -> Result<TelemetryFrame, TelemetryError> {
        let cpu_temperature = self.sensors.cpu_temperature()?;
        let load_average = self.sensors.load_average()?;
        let uptime = self.read_uptime()?;
        TelemetryFrame::from_readings(cpu_temperature, load_average, uptime)
    }

    /// Sample and write the frame to `link`. Nothing is written when any
    /// reading fails or does not fit the frame.
    ///
    /// * `link`: serial connection to the host.
    pub fn report<W: Write>(&self, link: &mut W) -> Result<TelemetryFrame, TelemetryError> {
        let frame = self.sample()?;
        link.write_all(&frame.to_bytes())
            .and_then(|_| link.flush())
            .map_err(TelemetryError::Link)?;
        info!(
            "Sent telemetry. CPU temp: {}, cpu load: {}, uptime: {}",
            frame.cpu_temperature(),
            frame.cpu_load(),
            frame.uptime()
        );
        Ok(frame)
    }

    fn read_uptime(&self) -> Result<u64, TelemetryError> {
        let contents =
            fs::read_to_string(&self.uptime_file).map_err(|source| TelemetryError::Uptime {
                path: self.uptime_file.clone(),
                source,
            })?;
        contents
            .trim()
            .parse()
            .map_err(|_| TelemetryError::UptimeParse {
                path: self.uptime_file.clone(),
                contents,
            })
    }
}
