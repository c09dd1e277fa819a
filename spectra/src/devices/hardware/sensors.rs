use crate::error::DeviceError;
use log::debug;
use serde::{Deserialize, Serialize};
use sysinfo::{Components, System};

/// Label fragment of the SoC thermal sensor, reported as
/// `cpu_thermal temp1` on the Pi.
pub const CPU_THERMAL_LABEL: &str = "cpu_thermal";

/// CPU health readings used by the telemetry frame.
pub trait CpuSensors {
    /// CPU temperature in degrees celsius.
    fn cpu_temperature(&self) -> Result<f64, DeviceError>;
    /// Load average over the last minute.
    fn load_average(&self) -> Result<f64, DeviceError>;
}

/// Which of the host's thermal components stands for the CPU.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
pub struct SensorConfig {
    /// Matched case insensitively against the component labels, the first
    /// component containing it is used.
    pub thermal_label: String,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            thermal_label: CPU_THERMAL_LABEL.to_string(),
        }
    }
}

/// CPU sensors of the machine the payload runs on.
pub struct HostCpuSensors {
    config: SensorConfig,
}

impl HostCpuSensors {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }
}

impl CpuSensors for HostCpuSensors {
    fn cpu_temperature(&self) -> Result<f64, DeviceError> {
        let components = Components::new_with_refreshed_list();
        select_temperature(
            components
                .list()
                .iter()
                .map(|component| (component.label(), component.temperature())),
            &self.config.thermal_label,
        )
    }

    fn load_average(&self) -> Result<f64, DeviceError> {
        Ok(System::load_average().one)
    }
}

/// Temperature of the first reading whose label contains `label`.
///
/// * `readings`: component label and temperature pairs.
/// * `label`: label fragment, compared case insensitively.
fn select_temperature<'a>(
    readings: impl IntoIterator<Item = (&'a str, f32)>,
    label: &str,
) -> Result<f64, DeviceError> {
    let wanted = label.to_lowercase();
    let (found, value) = readings
        .into_iter()
        .find(|(component, _)| component.to_lowercase().contains(&wanted))
        .ok_or_else(|| DeviceError::ThermalMissing {
            label: label.to_string(),
        })?;
    debug!("thermal component {:?} reads {}", found, value);
    if value.is_finite() {
        Ok(f64::from(value))
    } else {
        Err(DeviceError::ThermalReading {
            label: found.to_string(),
            value,
        })
    }
}
