// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Destination, EqualTemperament, FrequencyHz, MapsPitch, Note, ParameterType, Sample,
        SampleRate, Seconds, StageUid, UidFactory, VoiceUid,
    };
}

pub use {
    note::{EqualTemperament, MapsPitch, Note},
    numbers::{FrequencyHz, ParameterType, Sample, SampleType},
    time::{SampleRate, Seconds},
    uid::{Destination, IsUid, StageUid, UidFactory, VoiceUid},
};

mod note;
mod numbers;
mod time;
mod uid;
