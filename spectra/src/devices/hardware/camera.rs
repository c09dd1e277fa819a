use crate::error::DeviceError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{path::Path, process::Command};
use uuid::Uuid;

/// Camera with a motorised focus lens.
pub trait FocusCamera {
    /// Move the lens to the given focus motor position.
    fn set_focus(&mut self, focus: u16) -> Result<(), DeviceError>;
    /// Take a still image and write it to `output`.
    fn capture_to(&mut self, output: &Path) -> Result<(), DeviceError>;
}

/// Camera configuration. The focus motor and the still capture are both
/// driven by external commands, given as an argument vector where the
/// following placeholders are substituted before launch:
///
/// * `{focus}`: focus position in decimal.
/// * `{focus_msb}`, `{focus_lsb}`: the two register bytes of the focus
///   motor, in hex.
/// * `{output}`: path of the image to write.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
pub struct CameraConfig {
    /// Command that moves the focus motor.
    pub focus_command: Vec<String>,
    /// Command that captures a still image.
    pub capture_command: Vec<String>,
}

impl CameraConfig {
    /// Create a camera config from two argument vectors.
    ///
    /// * `focus_command`: program and arguments moving the lens.
    /// * `capture_command`: program and arguments taking the image.
    pub fn new<S: Into<String>>(
        focus_command: impl IntoIterator<Item = S>,
        capture_command: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            focus_command: focus_command.into_iter().map(Into::into).collect(),
            capture_command: capture_command.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for CameraConfig {
    /// The motor focus module answers on i2c address 0x0c of the camera
    /// bus, and stills are taken with libcamera.
    fn default() -> Self {
        Self::new(
            ["i2cset", "-y", "10", "0x0c", "{focus_msb}", "{focus_lsb}"],
            ["libcamera-still", "-n", "-t", "1", "-o", "{output}"],
        )
    }
}

/// Camera driven through the commands in its [`CameraConfig`].
pub struct CommandCamera {
    /// Unique identifier, helpful for trouble shooting and logging.
    uuid: Uuid,
    config: CameraConfig,
    /// Last focus position requested, substituted into the capture command.
    focus: Option<u16>,
}

impl CommandCamera {
    /// Create a new camera by consuming a config.
    ///
    /// * `config`: focus and capture commands.
    pub fn new(config: CameraConfig) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            config,
            focus: None,
        }
    }

    /// Return the unique identifier of the camera.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }
}

impl FocusCamera for CommandCamera {
    fn set_focus(&mut self, focus: u16) -> Result<(), DeviceError> {
        let (msb, lsb) = focus_register_bytes(focus);
        let args = substitute(&self.config.focus_command, |arg| {
            arg.replace("{focus_msb}", &format!("0x{msb:02x}"))
                .replace("{focus_lsb}", &format!("0x{lsb:02x}"))
                .replace("{focus}", &focus.to_string())
        });
        run(&args)?;
        self.focus = Some(focus);
        Ok(())
    }

    fn capture_to(&mut self, output: &Path) -> Result<(), DeviceError> {
        let focus = self.focus.map(|f| f.to_string()).unwrap_or_default();
        let output = output.to_string_lossy();
        let args = substitute(&self.config.capture_command, |arg| {
            arg.replace("{output}", &output).replace("{focus}", &focus)
        });
        run(&args)
    }
}

/// Split a focus position into the two bytes written to the focus motor.
/// The motor takes a 10 bit position shifted up by four.
pub fn focus_register_bytes(focus: u16) -> (u8, u8) {
    let value = (focus << 4) & 0x3ff0;
    (((value >> 8) & 0x3f) as u8, (value & 0xf0) as u8)
}

fn substitute(template: &[String], fill: impl Fn(&str) -> String) -> Vec<String> {
    template.iter().map(|arg| fill(arg)).collect()
}

fn run(args: &[String]) -> Result<(), DeviceError> {
    let (program, rest) = args.split_first().ok_or(DeviceError::EmptyCommand)?;
    debug!("running {:?}", args);
    let status = Command::new(program)
        .args(rest)
        .status()
        .map_err(|source| DeviceError::CommandLaunch {
            program: program.clone(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(DeviceError::CommandStatus {
            program: program.clone(),
            status,
        })
    }
}
