use crate::{
    devices::hardware::{
        camera::FocusCamera, led_strip::LedStrip, led_strip::Rgb, power_line::PowerLine,
        sensors::CpuSensors,
    },
    error::DeviceError,
};
use std::{
    cell::RefCell,
    fs,
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

/// Something a fake device was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareEvent {
    Power(bool),
    Show(Rgb),
    Focus(u16),
    Capture(PathBuf),
}

/// Ordered record of events shared by every fake built from it, so a
/// test can assert the interleaving across devices.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<HardwareEvent>>>);

impl Journal {
    fn record(&self, event: HardwareEvent) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<HardwareEvent> {
        self.0.borrow().clone()
    }

    /// True when the last power event left the line enabled.
    pub fn power_left_on(&self) -> bool {
        self.0
            .borrow()
            .iter()
            .rev()
            .find_map(|event| match event {
                HardwareEvent::Power(enabled) => Some(*enabled),
                _ => None,
            })
            .unwrap_or(false)
    }
}

fn unavailable(device: &str) -> DeviceError {
    DeviceError::CommandLaunch {
        program: device.to_string(),
        source: io::Error::new(io::ErrorKind::Other, "fake device failure"),
    }
}

pub struct FakePowerLine {
    journal: Journal,
}

impl PowerLine for FakePowerLine {
    fn set(&mut self, enabled: bool) -> Result<(), DeviceError> {
        self.journal.record(HardwareEvent::Power(enabled));
        Ok(())
    }
}

pub struct FakeLedStrip {
    journal: Journal,
    staged: Rgb,
}

impl LedStrip for FakeLedStrip {
    fn fill(&mut self, colour: Rgb) {
        self.staged = colour;
    }

    fn show(&mut self) -> Result<(), DeviceError> {
        self.journal.record(HardwareEvent::Show(self.staged));
        Ok(())
    }
}

/// Camera that writes a placeholder file instead of an image.
pub struct FakeCamera {
    journal: Journal,
    /// Fail every capture once set.
    pub fail_capture: bool,
}

impl FocusCamera for FakeCamera {
    fn set_focus(&mut self, focus: u16) -> Result<(), DeviceError> {
        self.journal.record(HardwareEvent::Focus(focus));
        Ok(())
    }

    fn capture_to(&mut self, output: &Path) -> Result<(), DeviceError> {
        if self.fail_capture {
            return Err(unavailable("fake-camera"));
        }
        self.journal
            .record(HardwareEvent::Capture(output.to_path_buf()));
        fs::write(output, b"\xFF\xD8fake\xFF\xD9").map_err(|source| DeviceError::CommandLaunch {
            program: "fake-camera".to_string(),
            source,
        })
    }
}

pub struct FakeSensors {
    pub temperature: f64,
    pub load: f64,
}

impl CpuSensors for FakeSensors {
    fn cpu_temperature(&self) -> Result<f64, DeviceError> {
        Ok(self.temperature)
    }

    fn load_average(&self) -> Result<f64, DeviceError> {
        Ok(self.load)
    }
}

/// A power line, strip and camera all recording into one journal.
pub fn fake_hardware() -> (Journal, FakePowerLine, FakeLedStrip, FakeCamera) {
    let journal = Journal::default();
    (
        journal.clone(),
        FakePowerLine {
            journal: journal.clone(),
        },
        FakeLedStrip {
            journal: journal.clone(),
            staged: Rgb::OFF,
        },
        FakeCamera {
            journal,
            fail_capture: false,
        },
    )
}
