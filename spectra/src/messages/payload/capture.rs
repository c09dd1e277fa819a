use crate::devices::hardware::led_strip::Rgb;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for one capture: where the lens is focused and which
/// colour the strip shows while the image is taken.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Focus motor position.
    pub focus: u16,
    /// Illumination colour.
    pub colour: Rgb,
}

impl CaptureRequest {
    pub const fn new(focus: u16, colour: Rgb) -> Self {
        Self { focus, colour }
    }

    /// Image filename for this request, embedding the serial number,
    /// focus and colour so the file is self describing once downlinked.
    ///
    /// * `output_prefix`: prefix given on the command line.
    /// * `serial_number`: value taken from the shot counter.
    pub fn filename(&self, output_prefix: &str, serial_number: u32) -> String {
        format!(
            "{}_SN{:05}_F{:04}_R{:03}_G{:03}_B{:03}.jpg",
            output_prefix,
            serial_number,
            self.focus,
            self.colour.red,
            self.colour.green,
            self.colour.blue
        )
    }
}

/// Outcome of a single capture.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CaptureResult {
    /// Serial number taken from the shot counter.
    pub serial_number: u32,
    /// Image file written by the camera.
    pub filename: String,
    /// Time from enabling the illumination power to switching it off.
    pub led_on_duration: Duration,
    /// When the capture finished.
    pub captured_at: DateTime<Utc>,
}
