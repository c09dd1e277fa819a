use crate::error::DeviceError;
use log::debug;
use serde::{Deserialize, Serialize};
use spidev::{SpiModeFlags, Spidev, SpidevOptions};
use std::{fmt::Display, io::Write, path::PathBuf};
use uuid::Uuid;

/// Number of pixels fitted around the lens on the payload board.
pub const PIXEL_COUNT: usize = 5;

/// SPI clock giving three SPI bits per 1.25us WS2812 bit.
pub const SPI_CLOCK_HZ: u32 = 2_400_000;
/// SPI pattern for a WS2812 `1` bit when clocked at 2.4 MHz.
const SPI_ONE: u32 = 0b110;
/// SPI pattern for a WS2812 `0` bit when clocked at 2.4 MHz.
const SPI_ZERO: u32 = 0b100;
/// Low bytes appended after the pixel data, holding the line low for
/// longer than the 280us latch time.
const LATCH_BYTES: usize = 90;

/// Colour of a single addressable pixel.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// All channels off.
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// An addressable LED strip. Colours are staged with [`LedStrip::fill`]
/// and only reach the pixels once [`LedStrip::show`] pushes them.
pub trait LedStrip {
    /// Stage the same colour on every pixel.
    fn fill(&mut self, colour: Rgb);
    /// Push the staged colours out to the pixels.
    fn show(&mut self) -> Result<(), DeviceError>;
}

/// Configuration for the WS2812 strip driven through a spidev node.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
pub struct LedStripConfig {
    /// SPI device node. The bench strip's data line is on GPIO21, the
    /// MOSI of SPI1 once `dtoverlay=spi1-1cs` is enabled.
    pub device: PathBuf,
    /// Number of pixels on the strip.
    pub pixel_count: usize,
}

impl Default for LedStripConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/spidev1.0"),
            pixel_count: PIXEL_COUNT,
        }
    }
}

/// WS2812 (NeoPixel) strip driven by writing pre-encoded bit patterns to
/// a spidev node. Each data bit is stretched to three SPI bits so the SPI
/// clock reproduces the strip's pulse timing.
pub struct SpiLedStrip<W = Spidev> {
    /// Unique identifier, helpful for trouble shooting and logging.
    uuid: Uuid,
    device: PathBuf,
    handle: W,
    pixels: Vec<Rgb>,
}

impl SpiLedStrip<Spidev> {
    /// Open the spidev node and clock it at [`SPI_CLOCK_HZ`], mode 0.
    ///
    /// * `config`: device node and pixel count.
    pub fn open(config: &LedStripConfig) -> Result<Self, DeviceError> {
        let led_error = |source| DeviceError::LedStrip {
            device: config.device.clone(),
            source,
        };
        let mut spi = Spidev::open(&config.device).map_err(led_error)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_CLOCK_HZ)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).map_err(led_error)?;
        Ok(Self::from_writer(
            config.device.clone(),
            spi,
            config.pixel_count,
        ))
    }
}

impl<W: Write> SpiLedStrip<W> {
    /// Wrap an already configured SPI handle.
    ///
    /// * `device`: node the handle was opened on, used in errors.
    /// * `handle`: destination of the encoded frames.
    /// * `pixel_count`: number of pixels on the strip.
    pub fn from_writer(device: PathBuf, handle: W, pixel_count: usize) -> Self {
        let strip = Self {
            uuid: Uuid::new_v4(),
            device,
            handle,
            pixels: vec![Rgb::OFF; pixel_count],
        };
        debug!(
            "LED strip {} on {:?} with {} pixels",
            strip.uuid, strip.device, pixel_count
        );
        strip
    }

    /// Return the unique identifier of the strip.
    pub fn get_uuid(&self) -> Uuid {
        self.uuid
    }
}

impl<W: Write> LedStrip for SpiLedStrip<W> {
    fn fill(&mut self, colour: Rgb) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = colour);
    }

    fn show(&mut self) -> Result<(), DeviceError> {
        let frame = encode_frame(&self.pixels);
        self.handle
            .write_all(&frame)
            .and_then(|_| self.handle.flush())
            .map_err(|source| DeviceError::LedStrip {
                device: self.device.clone(),
                source,
            })
    }
}

/// Encode the pixels as an SPI frame: green, red, blue per pixel, three
/// SPI bytes per colour byte, followed by the latch.
pub fn encode_frame(pixels: &[Rgb]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(pixels.len() * 9 + LATCH_BYTES);
    for pixel in pixels {
        for byte in [pixel.green, pixel.red, pixel.blue] {
            frame.extend_from_slice(&encode_byte(byte));
        }
    }
    frame.resize(frame.len() + LATCH_BYTES, 0);
    frame
}

fn encode_byte(byte: u8) -> [u8; 3] {
    let bits = (0..8).rev().fold(0u32, |acc, bit| {
        let pattern = if byte & (1 << bit) != 0 {
            SPI_ONE
        } else {
            SPI_ZERO
        };
        (acc << 3) | pattern
    });
    let [_, high, mid, low] = bits.to_be_bytes();
    [high, mid, low]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::NamedTempFile;

    #[rstest]
    #[case(0x00, [0x92, 0x49, 0x24])]
    #[case(0xFF, [0xDB, 0x6D, 0xB6])]
    #[case(0x80, [0xD2, 0x49, 0x24])]
    fn test_encode_byte(#[case] byte: u8, #[case] expected: [u8; 3]) {
        assert_eq!(encode_byte(byte), expected);
    }

    #[test]
    fn test_frame_is_green_red_blue_then_latch() {
        let frame = encode_frame(&[Rgb::new(0xFF, 0x00, 0x80)]);
        assert_eq!(frame.len(), 9 + LATCH_BYTES);
        assert_eq!(&frame[0..3], &encode_byte(0x00), "green goes first");
        assert_eq!(&frame[3..6], &encode_byte(0xFF), "red goes second");
        assert_eq!(&frame[6..9], &encode_byte(0x80), "blue goes last");
        assert!(frame[9..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_show_writes_filled_colour_to_every_pixel() {
        let mut strip = SpiLedStrip::from_writer(PathBuf::from("spi"), Vec::new(), 3);
        strip.fill(Rgb::new(100, 0, 0));
        strip.show().unwrap();
        assert_eq!(strip.handle, encode_frame(&[Rgb::new(100, 0, 0); 3]));
    }

    #[test]
    fn test_fill_without_show_writes_nothing() {
        let mut strip =
            SpiLedStrip::from_writer(PathBuf::from("spi"), Vec::new(), PIXEL_COUNT);
        strip.fill(Rgb::new(0, 0, 100));
        assert!(strip.handle.is_empty());
    }

    #[test]
    fn test_open_rejects_node_without_spi_clock() {
        // A regular file opens but cannot take the clock settings.
        let device = NamedTempFile::new().unwrap();
        let config = LedStripConfig {
            device: device.path().to_path_buf(),
            pixel_count: PIXEL_COUNT,
        };
        assert!(matches!(
            SpiLedStrip::open(&config),
            Err(DeviceError::LedStrip { .. })
        ));
        assert!(fs::read(device.path()).unwrap().is_empty());
    }

    #[test]
    fn test_default_device_is_spi1() {
        assert_eq!(
            LedStripConfig::default().device,
            PathBuf::from("/dev/spidev1.0")
        );
    }

    #[test]
    fn test_open_missing_device_fails() {
        let config = LedStripConfig {
            device: PathBuf::from("/nonexistent/spidev9.9"),
            pixel_count: PIXEL_COUNT,
        };
        assert!(matches!(
            SpiLedStrip::open(&config),
            Err(DeviceError::LedStrip { .. })
        ));
    }
}
