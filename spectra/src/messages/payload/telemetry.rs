use crate::error::TelemetryError;

/// Size of a frame on the wire.
pub const FRAME_LEN: usize = 5;
/// Largest uptime the three byte field can carry.
pub const MAX_UPTIME: u32 = 0x00FF_FFFF;

/// Health frame sent over the serial link. The wire layout is fixed and
/// big-endian:
///
/// | byte | field                      |
/// |------|----------------------------|
/// | 0    | CPU temperature, degrees C |
/// | 1    | 1 minute load average x100 |
/// | 2..5 | uptime                     |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelemetryFrame {
    cpu_temperature: u8,
    cpu_load: u8,
    uptime: u32,
}

impl TelemetryFrame {
    /// Build a frame from raw readings. Temperature and scaled load are
    /// truncated toward zero; a value that does not fit its field is
    /// rejected rather than wrapped.
    ///
    /// * `cpu_temperature`: degrees celsius.
    /// * `load_average`: 1 minute load average.
    /// * `uptime`: value read from the uptime file.
    pub fn from_readings(
        cpu_temperature: f64,
        load_average: f64,
        uptime: u64,
    ) -> Result<Self, TelemetryError> {
        Ok(Self {
            cpu_temperature: fit_byte("cpu_temperature", cpu_temperature.trunc() as i64)?,
            cpu_load: fit_byte("cpu_load", (load_average * 100.0).trunc() as i64)?,
            uptime: u32::try_from(uptime)
                .ok()
                .filter(|uptime| *uptime <= MAX_UPTIME)
                .ok_or(TelemetryError::FieldOverflow {
                    field: "uptime",
                    value: i64::try_from(uptime).unwrap_or(i64::MAX),
                })?,
        })
    }

    pub fn cpu_temperature(&self) -> u8 {
        self.cpu_temperature
    }

    pub fn cpu_load(&self) -> u8 {
        self.cpu_load
    }

    pub fn uptime(&self) -> u32 {
        self.uptime
    }

    /// Serialise the frame in wire order.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let [_, up_high, up_mid, up_low] = self.uptime.to_be_bytes();
        [self.cpu_temperature, self.cpu_load, up_high, up_mid, up_low]
    }

    /// Decode a frame received by the ground station.
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        let [cpu_temperature, cpu_load, up_high, up_mid, up_low] = bytes;
        Self {
            cpu_temperature,
            cpu_load,
            uptime: u32::from_be_bytes([0, up_high, up_mid, up_low]),
        }
    }
}

fn fit_byte(field: &'static str, value: i64) -> Result<u8, TelemetryError> {
    u8::try_from(value).map_err(|_| TelemetryError::FieldOverflow { field, value })
}
