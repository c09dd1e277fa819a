/// Devices are the atomic units that can be combined together
/// into components. Their core responsibilities do not change
/// based on where they are wired into the payload.
pub mod hardware {
    /// Device interface for the focus motor camera.
    pub mod camera;
    /// Device interface for the addressable LED strip.
    pub mod led_strip;
    /// Device interface for the illumination power enable pin.
    pub mod power_line;
    /// Device interface for the CPU temperature and load.
    pub mod sensors;
}
