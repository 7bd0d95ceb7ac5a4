// Copyright (c) 2024 Mike Tsao

use crate::{automation::AudioParam, prelude::*};
use core::{cell::RefCell, f64::consts::PI};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use strum_macros::{Display, EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Classic oscillator waveforms. The discriminants are the option indexes of
/// the generator's `type` parameter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    FromRepr,
    IntoStaticStr,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Waveform {
    /// Sine wave
    #[default]
    Sine,
    /// Triangle wave
    Triangle,
    /// Square wave
    Square,
    /// Sawtooth wave
    #[serde(rename = "saw")]
    #[strum(to_string = "saw")]
    Sawtooth,
}
impl Waveform {
    /// The option names, in index order, as a select parameter shows them.
    pub const NAMES: [&'static str; 4] = ["sine", "triangle", "square", "saw"];

    /// Returns the waveform's amplitude at `phase`, which is the position
    /// within one cycle (0.0..1.0).
    pub fn amplitude_at(&self, phase: f64) -> f64 {
        let phase = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (phase * 2.0 * PI).sin(),
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

#[derive(Debug, Default)]
struct ToneSourceState {
    waveform: Waveform,
    start: Option<Seconds>,
    stop: Option<Seconds>,
}

/// An oscillator-like signal source. A transport creates it, a voice owns it,
/// and the renderer reads it.
///
/// [ToneSource] is a handle. Clones refer to the same primitive, so a renderer
/// can hold on to a source until its scheduled stop even after the voice that
/// created it has gone away.
#[derive(Clone, Debug)]
pub struct ToneSource {
    uid: StageUid,
    frequency: AudioParam,
    detune: AudioParam,
    state: Rc<RefCell<ToneSourceState>>,
}
impl ToneSource {
    /// The frequency a source has before anyone programs it.
    pub const DEFAULT_FREQUENCY: FrequencyHz = FrequencyHz(440.0);

    /// Creates a new silent source. Transports call this from their factory
    /// method.
    pub fn new_with(uid: StageUid) -> Self {
        Self {
            uid,
            frequency: AudioParam::new_with(Self::DEFAULT_FREQUENCY.0),
            detune: AudioParam::default(),
            state: Default::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> StageUid {
        self.uid
    }

    #[allow(missing_docs)]
    pub fn waveform(&self) -> Waveform {
        self.state.borrow().waveform
    }

    #[allow(missing_docs)]
    pub fn set_waveform(&self, waveform: Waveform) {
        self.state.borrow_mut().waveform = waveform;
    }

    /// The base frequency, in Hz.
    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    /// The pitch offset, in cents, applied on top of the base frequency.
    pub fn detune(&self) -> &AudioParam {
        &self.detune
    }

    /// Schedules the source to begin sounding at `when`.
    pub fn start(&self, when: Seconds) {
        self.state.borrow_mut().start = Some(when);
    }

    /// Schedules the source to go silent at `when`. A later call replaces an
    /// earlier one.
    pub fn stop(&self, when: Seconds) {
        self.state.borrow_mut().stop = Some(when);
    }

    #[allow(missing_docs)]
    pub fn start_time(&self) -> Option<Seconds> {
        self.state.borrow().start
    }

    #[allow(missing_docs)]
    pub fn stop_time(&self) -> Option<Seconds> {
        self.state.borrow().stop
    }

    /// Whether the source produces signal at `when`.
    pub fn is_sounding_at(&self, when: Seconds) -> bool {
        let state = self.state.borrow();
        state.start.is_some_and(|start| when >= start)
            && state.stop.map_or(true, |stop| when < stop)
    }

    /// The frequency actually heard at `when`, with detune applied.
    pub fn effective_frequency_at(&self, when: Seconds) -> FrequencyHz {
        FrequencyHz(self.frequency.value_at(when)).detuned_by(self.detune.value_at(when))
    }

    /// Whether the two handles refer to the same primitive.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
