use crate::{
    components::payload::{
        actuating::illumination::Illumination, recording::activity_log::ActivityLog,
        sensing::shot_counter::ShotCounter,
    },
    devices::hardware::{camera::FocusCamera, led_strip::LedStrip, power_line::PowerLine},
    error::PayloadError,
    messages::payload::{
        activity::ActivityLogEntry,
        capture::{CaptureRequest, CaptureResult},
    },
};
use chrono::Utc;
use log::{info, warn};
use std::{path::Path, time::Instant};
use uuid::Uuid;

/// Takes one illuminated image at a time: the serial number is claimed,
/// the light is brought up, the camera focuses and captures, the light
/// is dropped and the capture is logged.
pub struct CaptureSequencer<P, L, C> {
    /// Unique id of the sequencer.
    uuid: Uuid,
    counter: ShotCounter,
    activity_log: ActivityLog,
    illumination: Illumination<P, L>,
    camera: C,
}

impl<P, L, C> CaptureSequencer<P, L, C>
where
    P: PowerLine,
    L: LedStrip,
    C: FocusCamera,
{
    /// Create a sequencer from handles acquired by the caller.
    ///
    /// * `counter`: source of serial numbers.
    /// * `activity_log`: log receiving one line per capture.
    /// * `illumination`: light source for the captures.
    /// * `camera`: focusing camera.
    pub fn new(
        counter: ShotCounter,
        activity_log: ActivityLog,
        illumination: Illumination<P, L>,
        camera: C,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            counter,
            activity_log,
            illumination,
            camera,
        }
    }

    /// Return the unique id of the sequencer.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.activity_log
    }

    /// Take a single image for `request`. Nothing is retried; the first
    /// failure is returned as is.
    ///
    /// * `output_prefix`: prefix of the generated image filename.
    /// * `request`: focus and colour for this image.
    pub fn capture(
        &mut self,
        output_prefix: &str,
        request: CaptureRequest,
    ) -> Result<CaptureResult, PayloadError> {
        let serial_number = self.counter.next_serial()?;
        let filename = request.filename(output_prefix, serial_number);
        info!(
            "About to take an image (#{}). Focus: {}, colour: {}",
            serial_number, request.focus, request.colour
        );

        let led_start = Instant::now();
        // TODO: switch the power line off when the camera fails between
        //       switch_on and switch_off, currently the LEDs stay lit.
        self.illumination
            .switch_on(request.colour)
            .and_then(|_| self.camera.set_focus(request.focus))
            .and_then(|_| self.camera.capture_to(Path::new(&filename)))
            .and_then(|_| self.illumination.switch_off())
            .map_err(|e| {
                warn!("capture #{serial_number} failed, illumination may still be on");
                e
            })?;
        let led_on_duration = led_start.elapsed();
        info!("LEDs were on for {:.3} sec", led_on_duration.as_secs_f64());

        let result = CaptureResult {
            serial_number,
            filename,
            led_on_duration,
            captured_at: Utc::now(),
        };
        self.activity_log
            .append(&ActivityLogEntry::new(request, &result))?;
        Ok(result)
    }
}
