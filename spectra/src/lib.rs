/**
The spectra payload software drives a camera bench test: a fixed sweep of
photographs is taken under controlled illumination, each capture is logged,
and the results are bundled into one archive for downlink. Functionality is
split into devices and components so that the hardware handles can be swapped
for fakes while the sequencing logic stays untouched.
*/

/// Components in the system are created by grouping together
/// devices into a logical unit that performs some function
/// for the payload test.
pub mod components;
/// Devices that are an atomic unit, and can be composed
/// with other devices into components to perform some function.
pub mod devices;
/// Error types shared by the devices and components.
pub mod error;
/// Records produced by the payload, such as capture results,
/// activity log lines and telemetry frames.
pub mod messages;
/// Development utilities for configuration files and tests.
pub mod utils;
