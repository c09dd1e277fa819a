/// Helpers for reading and writing yaml configuration files.
pub mod config;
/// Fake hardware handles that record what the components asked of them.
#[cfg(test)]
pub mod fakes;
