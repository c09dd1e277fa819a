use crate::{
    devices::hardware::{
        led_strip::{LedStrip, Rgb},
        power_line::PowerLine,
    },
    error::DeviceError,
};
use log::debug;
use std::{thread, time::Duration};
use uuid::Uuid;

/// Pause after each illumination change so the power rail and then the
/// pixel colour have settled before anything relies on them.
pub const STABILISATION_DELAY: Duration = Duration::from_millis(500);

/// Component that pairs the enable line with the LED strip it powers.
/// Both handles are acquired once by the caller and held here for the
/// whole run.
pub struct Illumination<P, L> {
    /// Unique id of the component.
    uuid: Uuid,
    power_line: P,
    strip: L,
}

impl<P: PowerLine, L: LedStrip> Illumination<P, L> {
    /// Group a power line and strip into one light source.
    ///
    /// * `power_line`: enable line of the LED driver.
    /// * `strip`: the pixels powered by that line.
    pub fn new(power_line: P, strip: L) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            power_line,
            strip,
        }
    }

    /// Return the unique id of the component.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }

    /// Power the strip, wait, show `colour`, and wait again. Blocks for
    /// twice [`STABILISATION_DELAY`].
    ///
    /// * `colour`: colour shown on every pixel.
    pub fn switch_on(&mut self, colour: Rgb) -> Result<(), DeviceError> {
        debug!("illumination {} on with {}", self.uuid, colour);
        self.power_line.set(true)?;
        thread::sleep(STABILISATION_DELAY);
        self.strip.fill(colour);
        self.strip.show()?;
        thread::sleep(STABILISATION_DELAY);
        Ok(())
    }

    /// Blank the strip and cut its power.
    pub fn switch_off(&mut self) -> Result<(), DeviceError> {
        debug!("illumination {} off", self.uuid);
        self.strip.fill(Rgb::OFF);
        self.strip.show()?;
        self.power_line.set(false)
    }
}
