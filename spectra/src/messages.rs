/// Standardise the records the payload produces so the ground
/// tooling can rely on them. Provide test suite to ensure the
/// formats are respected.
pub mod payload {
    /// Capture requests and their results.
    pub mod capture;
    /// One line of the activity log.
    pub mod activity;
    /// Fixed width telemetry frame sent over the serial link.
    pub mod telemetry;
}
