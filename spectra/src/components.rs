/// Components that are placed within the camera payload.
pub mod payload {
    /// Components that provide actuation capability.
    pub mod actuating {
        /// Power line and LED strip grouped into one light source.
        pub mod illumination;
    }
    /// Components that provide sensing capability.
    pub mod sensing {
        /// Persistent serial number for captured images.
        pub mod shot_counter;
        /// A single illuminated capture.
        pub mod capture_sequencer;
    }
    /// Components that keep a record of what the payload did.
    pub mod recording {
        /// Append only log of captures.
        pub mod activity_log;
        /// Compressed bundle of the run outputs.
        pub mod archive;
    }
    /// Components that report on the health of the payload.
    pub mod reporting {
        /// CPU health frames over the serial link.
        pub mod telemetry;
    }
    /// The fixed colour sweep.
    pub mod run;
}

/// Helpful prelude when working with components.
pub mod prelude {
    pub use crate::components::payload::actuating::illumination::*;
    pub use crate::components::payload::recording::activity_log::*;
    pub use crate::components::payload::recording::archive::*;
    pub use crate::components::payload::reporting::telemetry::*;
    pub use crate::components::payload::run::*;
    pub use crate::components::payload::sensing::capture_sequencer::*;
    pub use crate::components::payload::sensing::shot_counter::*;
}
