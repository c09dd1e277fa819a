use crate::messages::payload::capture::{CaptureRequest, CaptureResult};
use std::{fmt::Display, time::Duration};

/// One line of the activity log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivityLogEntry {
    pub serial_number: u32,
    pub request: CaptureRequest,
    pub led_on_duration: Duration,
}

impl ActivityLogEntry {
    /// Pair a result with the request that produced it.
    pub fn new(request: CaptureRequest, result: &CaptureResult) -> Self {
        Self {
            serial_number: result.serial_number,
            request,
            led_on_duration: result.led_on_duration,
        }
    }
}

impl Display for ActivityLogEntry {
    /// `SN,Focus,R,G,B,LED_on_sec`, blue zero padded to four digits.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:05},{:04},{:03},{:03},{:04},{:.3}",
            self.serial_number,
            self.request.focus,
            self.request.colour.red,
            self.request.colour.green,
            self.request.colour.blue,
            self.led_on_duration.as_secs_f64()
        )
    }
}
