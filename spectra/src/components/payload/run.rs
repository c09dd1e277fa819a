use crate::{
    components::payload::{
        actuating::illumination::Illumination,
        recording::{
            activity_log::{ActivityLog, ACTIVITY_LOG_FILE},
            archive::Archiver,
        },
        sensing::{
            capture_sequencer::CaptureSequencer,
            shot_counter::{ShotCounter, COUNTER_FILE},
        },
    },
    devices::hardware::{
        camera::{CameraConfig, CommandCamera, FocusCamera},
        led_strip::{LedStrip, LedStripConfig, Rgb, SpiLedStrip},
        power_line::{PowerLine, PowerLineConfig, SysfsPowerLine},
    },
    error::PayloadError,
    messages::payload::capture::{CaptureRequest, CaptureResult},
    utils::config::{read_yaml_config, write_yaml_config},
};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};
use uuid::Uuid;

/// Prefix used when none is given on the command line.
pub const DEFAULT_OUTPUT_PREFIX: &str = "image_";
/// Focus motor position for the near focus shots.
pub const NEAR_FOCUS: u16 = 1000;
/// Focus motor position for the far focus shot.
pub const FAR_FOCUS: u16 = 100;
/// Channel intensity used for every lit shot.
pub const INTENSITY: u8 = 100;

/// The shots of a run, declared in the order they are taken.
#[derive(EnumIter, IntoStaticStr, Display, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shot {
    /// No light, gives the sensor's dark level.
    Dark,
    Red,
    Green,
    Blue,
    WhiteNear,
    WhiteFar,
}

impl Shot {
    /// Focus and colour for this shot.
    pub fn request(self) -> CaptureRequest {
        let white = Rgb::new(INTENSITY, INTENSITY, INTENSITY);
        match self {
            Shot::Dark => CaptureRequest::new(NEAR_FOCUS, Rgb::OFF),
            Shot::Red => CaptureRequest::new(NEAR_FOCUS, Rgb::new(INTENSITY, 0, 0)),
            Shot::Green => CaptureRequest::new(NEAR_FOCUS, Rgb::new(0, INTENSITY, 0)),
            Shot::Blue => CaptureRequest::new(NEAR_FOCUS, Rgb::new(0, 0, INTENSITY)),
            Shot::WhiteNear => CaptureRequest::new(NEAR_FOCUS, white),
            Shot::WhiteFar => CaptureRequest::new(FAR_FOCUS, white),
        }
    }
}

/// Configuration of the capture run. Only where things live and how the
/// hardware is wired is configurable; the shots themselves are fixed.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct CaptureRunConfig {
    /// Directory holding the counter and the activity log.
    #[serde(default)]
    pub state_dir: PathBuf,
    /// Illumination power enable pin.
    #[serde(default)]
    pub power_line: PowerLineConfig,
    /// Addressable LED strip.
    #[serde(default)]
    pub led_strip: LedStripConfig,
    /// Focus motor and still capture commands.
    #[serde(default)]
    pub camera: CameraConfig,
}

impl CaptureRunConfig {
    /// Build the config by reading a file.
    ///
    /// * `filepath`: path to config.
    pub fn from_file<F: AsRef<OsStr>>(filepath: F) -> Result<Self, PayloadError> {
        read_yaml_config(filepath)
    }

    /// Write the config to a file, mainly used to generate the files
    /// deployed with the payload.
    ///
    /// * `filepath`: destination file.
    pub fn to_file<F: AsRef<OsStr>>(&self, filepath: F) -> Result<(), PayloadError> {
        write_yaml_config(self, filepath)
    }

    pub fn counter_file(&self) -> PathBuf {
        self.state_dir.join(COUNTER_FILE)
    }

    pub fn activity_log_file(&self) -> PathBuf {
        self.state_dir.join(ACTIVITY_LOG_FILE)
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Unique id of the run, matches the run's log lines.
    pub run_id: Uuid,
    /// Results in the order the shots were taken.
    pub captures: Vec<CaptureResult>,
    /// Archive holding the activity log and every image.
    pub archive: PathBuf,
}

impl RunReport {
    /// Image filenames in capture order.
    pub fn filenames(&self) -> Vec<&str> {
        self.captures.iter().map(|c| c.filename.as_str()).collect()
    }
}

/// Component that takes the whole shot list and archives the result.
pub struct CaptureRun<P, L, C> {
    /// Unique id of the component.
    uuid: Uuid,
    sequencer: CaptureSequencer<P, L, C>,
    archiver: Archiver,
}

impl CaptureRun<SysfsPowerLine, SpiLedStrip, CommandCamera> {
    /// Acquire the payload hardware described by `config`. The handles
    /// are held until the run is dropped.
    ///
    /// * `config`: hardware wiring and file locations.
    pub fn from_config(config: &CaptureRunConfig) -> Result<Self, PayloadError> {
        let illumination = Illumination::new(
            SysfsPowerLine::open(&config.power_line)?,
            SpiLedStrip::open(&config.led_strip)?,
        );
        Ok(Self::new(
            CaptureSequencer::new(
                ShotCounter::new(config.counter_file()),
                ActivityLog::new(config.activity_log_file()),
                illumination,
                CommandCamera::new(config.camera.clone()),
            ),
        ))
    }

    /// Read a config file and acquire the hardware it describes.
    ///
    /// * `filepath`: path to a [`CaptureRunConfig`] file.
    pub fn from_config_file<F: AsRef<OsStr>>(filepath: F) -> Result<Self, PayloadError> {
        Self::from_config(&CaptureRunConfig::from_file(filepath)?)
    }
}

impl<P, L, C> CaptureRun<P, L, C>
where
    P: PowerLine,
    L: LedStrip,
    C: FocusCamera,
{
    /// Create a run around an existing sequencer. The archive always
    /// leads with the sequencer's activity log.
    pub fn new(sequencer: CaptureSequencer<P, L, C>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            archiver: Archiver::new(sequencer.activity_log().path()),
            sequencer,
        }
    }

    /// Return the unique id of the run.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }

    /// Take every [`Shot`] in order, then archive the log and images.
    /// The first failure stops the run.
    ///
    /// * `output_prefix`: prefix for the images and the archive.
    pub fn execute(&mut self, output_prefix: &str) -> Result<RunReport, PayloadError> {
        info!("run {} starting with prefix {:?}", self.uuid, output_prefix);
        let mut captures = Vec::new();
        for shot in Shot::iter() {
            info!("run {}: {} shot", self.uuid, shot);
            captures.push(self.sequencer.capture(output_prefix, shot.request())?);
        }

        let filenames: Vec<&Path> = captures.iter().map(|c| Path::new(&c.filename)).collect();
        let archive = self.archiver.archive(output_prefix, &filenames)?;
        info!("run {} archived {} images", self.uuid, captures.len());
        Ok(RunReport {
            run_id: self.uuid,
            captures,
            archive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{CounterError, DeviceError},
        messages::payload::activity::ActivityLogEntry,
        test_file_path,
        utils::fakes::{fake_hardware, FakeCamera, FakeLedStrip, FakePowerLine, Journal},
    };
    use flate2::read::GzDecoder;
    use serial_test::serial;
    use std::fs::{self, File};
    use tar::Archive;
    use tempfile::TempDir;

    fn fake_run(
        state_dir: &Path,
    ) -> (Journal, CaptureRun<FakePowerLine, FakeLedStrip, FakeCamera>) {
        let config = CaptureRunConfig {
            state_dir: state_dir.to_path_buf(),
            ..Default::default()
        };
        let (journal, power_line, strip, camera) = fake_hardware();
        let run = CaptureRun::new(CaptureSequencer::new(
            ShotCounter::new(config.counter_file()),
            ActivityLog::new(config.activity_log_file()),
            Illumination::new(power_line, strip),
            camera,
        ));
        (journal, run)
    }

    #[test]
    fn test_shot_list_order_and_parameters() {
        let shots: Vec<(&'static str, CaptureRequest)> = Shot::iter()
            .map(|shot| (shot.into(), shot.request()))
            .collect();
        assert_eq!(
            shots,
            vec![
                ("Dark", CaptureRequest::new(1000, Rgb::new(0, 0, 0))),
                ("Red", CaptureRequest::new(1000, Rgb::new(100, 0, 0))),
                ("Green", CaptureRequest::new(1000, Rgb::new(0, 100, 0))),
                ("Blue", CaptureRequest::new(1000, Rgb::new(0, 0, 100))),
                ("WhiteNear", CaptureRequest::new(1000, Rgb::new(100, 100, 100))),
                ("WhiteFar", CaptureRequest::new(100, Rgb::new(100, 100, 100))),
            ]
        );
    }

    #[test]
    fn test_full_run_from_counter_seven() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(COUNTER_FILE), "7").unwrap();
        let (journal, mut run) = fake_run(dir.path());
        let prefix = dir.path().join("image_").to_string_lossy().into_owned();

        let report = run.execute(&prefix).unwrap();

        let expected: Vec<String> = [
            "SN00007_F1000_R000_G000_B000",
            "SN00008_F1000_R100_G000_B000",
            "SN00009_F1000_R000_G100_B000",
            "SN00010_F1000_R000_G000_B100",
            "SN00011_F1000_R100_G100_B100",
            "SN00012_F0100_R100_G100_B100",
        ]
        .iter()
        .map(|fields| format!("{prefix}_{fields}.jpg"))
        .collect();
        assert_eq!(report.filenames(), expected);
        assert_eq!(report.run_id, run.get_uuid());
        assert_eq!(
            fs::read_to_string(dir.path().join(COUNTER_FILE)).unwrap(),
            "13"
        );
        assert!(!journal.power_left_on());

        // One log line per capture, in capture order.
        let log = fs::read_to_string(dir.path().join(ACTIVITY_LOG_FILE)).unwrap();
        let expected_lines: Vec<String> = Shot::iter()
            .zip(&report.captures)
            .map(|(shot, result)| ActivityLogEntry::new(shot.request(), result).to_string())
            .collect();
        assert_eq!(log.lines().collect::<Vec<_>>(), expected_lines);
        for result in &report.captures {
            assert!(result.led_on_duration.as_secs_f64() >= 1.0);
        }

        // Activity log first, then the six images.
        assert_eq!(report.archive, PathBuf::from(format!("{prefix}_all.tar")));
        let mut archive = Archive::new(GzDecoder::new(File::open(&report.archive).unwrap()));
        let names: Vec<PathBuf> = archive
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().path().unwrap().into_owned())
            .collect();
        assert_eq!(names.len(), 7);
        assert!(names[0].ends_with(ACTIVITY_LOG_FILE));
        for (name, filename) in names[1..].iter().zip(report.filenames()) {
            assert!(Path::new(filename).ends_with(name.file_name().unwrap()));
        }
    }

    #[test]
    fn test_missing_counter_aborts_before_any_capture() {
        let dir = TempDir::new().unwrap();
        let (journal, mut run) = fake_run(dir.path());
        let prefix = dir.path().join("image_").to_string_lossy().into_owned();

        let result = run.execute(&prefix);

        assert!(matches!(
            result,
            Err(PayloadError::Counter(CounterError::Io { .. }))
        ));
        assert!(journal.events().is_empty(), "Hardware must not be touched");
        let created: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(created.is_empty(), "No image, log or archive may be created");
    }

    #[test]
    fn test_default_config_matches_bench_wiring() {
        let config = CaptureRunConfig::default();
        assert_eq!(config.counter_file(), PathBuf::from(COUNTER_FILE));
        assert_eq!(config.activity_log_file(), PathBuf::from(ACTIVITY_LOG_FILE));
        assert_eq!(config.power_line.pin, 23);
        assert_eq!(config.led_strip.pixel_count, 5);
    }

    #[test]
    #[serial]
    fn test_read_shipped_config_file() {
        let file = test_file_path!("/config/components/payload/capture_run.yaml");
        let config = CaptureRunConfig::from_file(file).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/home/pi/payload"));
        assert_eq!(config.power_line, PowerLineConfig::new(23));
        assert_eq!(config.led_strip, LedStripConfig::default());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_write_read_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capture_run.yaml");
        let mut write_config = CaptureRunConfig {
            state_dir: PathBuf::from("/var/lib/payload"),
            ..Default::default()
        };
        write_config.power_line.pin = 24;
        write_config.led_strip.device = PathBuf::from("/dev/spidev0.0");
        write_config.to_file(&path).unwrap();

        let read_config = CaptureRunConfig::from_file(&path).unwrap();
        assert_eq!(write_config, read_config, "Failed to read write run config");
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        assert!(matches!(
            CaptureRunConfig::from_file("/nonexistent/capture_run.yaml"),
            Err(PayloadError::ConfigMissing(_))
        ));
    }

    #[test]
    fn test_missing_led_device_fails_acquisition() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("gpio23")).unwrap();
        let config = CaptureRunConfig {
            state_dir: dir.path().to_path_buf(),
            power_line: PowerLineConfig {
                pin: 23,
                chip_base: None,
                sysfs_root: dir.path().to_path_buf(),
            },
            led_strip: LedStripConfig {
                device: dir.path().join("spidev0.0"),
                pixel_count: 5,
            },
            camera: CameraConfig::default(),
        };
        assert!(matches!(
            CaptureRun::from_config(&config),
            Err(PayloadError::Device(DeviceError::LedStrip { .. }))
        ));
    }

    #[cfg_attr(not(feature = "hardware_test"), ignore)]
    #[test]
    #[serial]
    /// Full sweep on the bench. Needs the counter file in the working
    /// directory and writes the images and archive next to it.
    fn test_run_on_bench() {
        let mut run = CaptureRun::from_config(&CaptureRunConfig::default()).unwrap();
        let report = run.execute("hardware_test").unwrap();
        assert_eq!(report.captures.len(), 6);
        assert!(report.archive.is_file());
    }
}
