// Copyright (c) 2024 Mike Tsao

//! The audio primitives that voices are built from, and a transport that
//! creates, schedules, routes, and renders them offline.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{AmplitudeStage, OfflineTransport, ToneSource, Waveform};
}

pub use generators::{ToneSource, Waveform};
pub use modulators::AmplitudeStage;
pub use transport::OfflineTransport;

mod generators;
mod modulators;
mod transport;
