use crate::error::DeviceError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// BCM pin that gates power to the LED driver on the payload board.
pub const LED_ENABLE_PIN: u32 = 23;
/// Label prefix of the gpiochip carrying the SoC header pins.
const SOC_CHIP_LABEL: &str = "pinctrl-";

/// Digital output that switches power to the illumination hardware.
/// Implemented by the sysfs GPIO device below and by fakes in tests.
pub trait PowerLine {
    /// Drive the line high (`true`) or low (`false`).
    fn set(&mut self, enabled: bool) -> Result<(), DeviceError>;
}

/// Configuration for the illumination power enable pin.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
pub struct PowerLineConfig {
    /// BCM numbered pin wired to the LED driver enable.
    pub pin: u32,
    /// Sysfs number of BCM pin 0. Read from the SoC gpiochip when unset;
    /// kernels from 6.6 place it at 512 rather than 0.
    #[serde(default)]
    pub chip_base: Option<u32>,
    /// Root of the sysfs GPIO class, only changed for tests or
    /// boards that mount sysfs elsewhere.
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/class/gpio")
}

impl PowerLineConfig {
    /// Create a new power line config on the standard sysfs root.
    ///
    /// * `pin`: BCM pin number.
    pub fn new(pin: u32) -> Self {
        Self {
            pin,
            chip_base: None,
            sysfs_root: default_sysfs_root(),
        }
    }

    /// Number of the pin in the sysfs GPIO namespace.
    pub fn sysfs_number(&self) -> u32 {
        self.pin + self.chip_base.unwrap_or_else(|| soc_chip_base(&self.sysfs_root))
    }
}

/// Base of the SoC gpiochip under `sysfs_root`, or 0 when no chip
/// advertises itself as the SoC pin controller.
fn soc_chip_base(sysfs_root: &Path) -> u32 {
    let Ok(entries) = fs::read_dir(sysfs_root) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("gpiochip"))
        .filter(|entry| {
            fs::read_to_string(entry.path().join("label"))
                .map(|label| label.trim().starts_with(SOC_CHIP_LABEL))
                .unwrap_or(false)
        })
        .filter_map(|entry| {
            fs::read_to_string(entry.path().join("base"))
                .ok()
                .and_then(|base| base.trim().parse().ok())
        })
        .min()
        .unwrap_or(0)
}

impl Default for PowerLineConfig {
    fn default() -> Self {
        Self::new(LED_ENABLE_PIN)
    }
}

/// Power line backed by the sysfs GPIO interface. The pin is exported
/// and configured as an output once, when the device is opened, and then
/// held for the lifetime of the process.
pub struct SysfsPowerLine {
    /// Unique identifier, helpful for trouble shooting and logging.
    uuid: Uuid,
    pin: u32,
    /// `<sysfs_root>/gpio<sysfs number>`
    pin_dir: PathBuf,
}

impl SysfsPowerLine {
    /// Export the pin if needed and set it as an output.
    ///
    /// * `config`: pin and sysfs location.
    pub fn open(config: &PowerLineConfig) -> Result<Self, DeviceError> {
        let pin = config.pin;
        let number = config.sysfs_number();
        let pin_dir = config.sysfs_root.join(format!("gpio{number}"));
        if !pin_dir.is_dir() {
            write_attribute(pin, &config.sysfs_root.join("export"), &number.to_string())?;
        }
        write_attribute(pin, &pin_dir.join("direction"), "out")?;
        let line = Self {
            uuid: Uuid::new_v4(),
            pin,
            pin_dir,
        };
        debug!(
            "power line {} opened on GPIO {} (sysfs {})",
            line.uuid, pin, number
        );
        Ok(line)
    }

    /// Return the unique identifier of the power line.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }
}

impl PowerLine for SysfsPowerLine {
    fn set(&mut self, enabled: bool) -> Result<(), DeviceError> {
        debug!("GPIO {} -> {}", self.pin, enabled);
        write_attribute(
            self.pin,
            &self.pin_dir.join("value"),
            if enabled { "1" } else { "0" },
        )
    }
}

fn write_attribute(pin: u32, path: &Path, value: &str) -> Result<(), DeviceError> {
    fs::write(path, value).map_err(|source| DeviceError::Gpio {
        pin,
        path: path.to_path_buf(),
        source,
    })
}
