// Copyright (c) 2024 Mike Tsao

//! The voice engine. A [Generator] turns note-on and note-off requests into
//! declarative, time-stamped automation on audio primitives that a transport
//! creates and a renderer plays.
//!
//! Everything happens on one control thread. `note_on()` and `note_off()`
//! return as soon as they've programmed the primitives and registered any
//! deferred work with the transport; nothing blocks or waits. Deferred work
//! comes back through [Generator::perform()].

use crate::{
    elements::Waveform,
    prelude::*,
    util::{GeneratorConfig, SchedulingPolicy},
};
use crossbeam::channel::{unbounded, Receiver, Sender};
use delegate::delegate;
use derivative::Derivative;
use log::{debug, trace, warn};

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Generator, GeneratorEvent, Parameter, ParameterChange, ParameterId, ParameterKind,
        ParameterSet, Release, ReleaseCause, ScheduledTask, Voice, VoiceError,
    };
}

pub use events::{GeneratorEvent, ScheduledTask, VoiceError};
pub use params::{Parameter, ParameterChange, ParameterId, ParameterKind, ParameterSet};
pub use voice::{Release, ReleaseCause, Voice};

mod events;
mod params;
mod voice;

/// A polyphonic subtractive-style tone generator. Each note gets its own
/// [Voice] with an independent envelope.
///
/// Performance parameters (`finetune` and `notedetune`) reach every active
/// voice as soon as they change. Shape parameters (waveform, envelope, glide)
/// are read at note-on and affect only later notes.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Generator {
    params: ParameterSet,
    parameter_changes: Receiver<ParameterChange>,
    config: GeneratorConfig,

    #[derivative(Debug = "ignore")]
    pitch: Box<dyn MapsPitch>,

    voices: Vec<Voice>,
    last_note: Option<Note>,
    voice_uid_factory: UidFactory<VoiceUid>,
    subscribers: Vec<Sender<GeneratorEvent>>,
}
impl Default for Generator {
    fn default() -> Self {
        Self::new_with(ParameterSet::default(), GeneratorConfig::default())
    }
}
impl Generator {
    /// Creates a generator that owns `params` and listens for its changes.
    pub fn new_with(mut params: ParameterSet, config: GeneratorConfig) -> Self {
        let parameter_changes = params.subscribe();
        Self {
            params,
            parameter_changes,
            config,
            pitch: Box::new(EqualTemperament::default()),
            voices: Default::default(),
            last_note: None,
            voice_uid_factory: Default::default(),
            subscribers: Default::default(),
        }
    }

    /// Replaces the default equal-tempered note-to-frequency mapping.
    pub fn with_pitch_mapping<P: MapsPitch + 'static>(mut self, pitch: P) -> Self {
        self.pitch = Box::new(pitch);
        self
    }

    /// Starts a new voice sounding `note` at `time`, and returns its handle.
    ///
    /// Retriggering a pitch that's already sounding creates an independent
    /// second voice. If `sustain` is off, the voice releases itself as soon
    /// as its decay finishes.
    pub fn note_on<T: Transport + RoutesSignals + ?Sized>(
        &mut self,
        note: Note,
        transport: &mut T,
        time: Seconds,
    ) -> Result<VoiceUid, VoiceError> {
        self.handle_parameter_changes();
        let time = self.check_time(transport, time)?;

        let source = transport.create_source();
        let stage = transport.create_amplitude_stage();
        stage.connect_source(&source);
        transport.connect(&stage, self.config.destination());

        let frequency = self.pitch.note_to_frequency(note);
        source.set_waveform(self.waveform());
        source.detune().set_value(self.detune());
        source.start(time);

        let attack = Seconds::from_millis(self.params.value(ParameterId::Attack));
        let decay = Seconds::from_millis(self.params.value(ParameterId::Decay));
        let peak = self.params.percent(ParameterId::Volume);
        let plateau = peak * self.params.percent(ParameterId::DecayVolume);
        let attack_end = time + attack;
        let decay_end = attack_end + decay;

        let gain = stage.gain();
        gain.cancel_scheduled_values(Seconds::ZERO);
        gain.set_value(0.0);
        gain.set_value_at_time(0.0, time);
        gain.linear_ramp_to_value_at_time(peak, attack_end);
        gain.linear_ramp_to_value_at_time(plateau, decay_end);
        trace!("Envelope: 0 at {time}, {peak} at {attack_end}, {plateau} at {decay_end}");

        let glide = self.params.percent(ParameterId::Glide);
        match self.last_note {
            Some(previous) if glide > 0.0 => {
                let glide_end = time + (attack + decay) * glide;
                let from = self.pitch.note_to_frequency(previous);
                source.frequency().set_value(from.0);
                source.frequency().set_value_at_time(from.0, time);
                source
                    .frequency()
                    .linear_ramp_to_value_at_time(frequency.0, glide_end);
                trace!("Gliding {from}Hz -> {frequency}Hz by {glide_end}");
            }
            _ => source.frequency().set_value(frequency.0),
        }
        self.last_note = Some(note);

        let uid = self.voice_uid_factory.mint_next();
        transport.schedule_at(time, ScheduledTask::NotifyNoteOn { voice: uid, note });
        self.voices.push(Voice::new_with(
            uid, note, source, stage, time, attack_end, decay_end,
        ));
        debug!("Voice {uid} on: {note} at {time}");

        if !self.params.get(ParameterId::Sustain).is_on() {
            let index = self.voices.len() - 1;
            self.release(index, transport, decay_end, ReleaseCause::Automatic);
        }
        Ok(uid)
    }

    /// Releases `voice` at `time`. The release ramps to silence from
    /// whatever level the voice has at `time`.
    ///
    /// A handle is good for one note-off. A voice that released itself
    /// (because `sustain` was off) accepts one more, which moves the release
    /// earlier if `time` comes before the automatic release, and otherwise
    /// changes nothing.
    ///
    /// A voice can't be released before it starts. Such a `time` is
    /// rejected, or moved up to the voice's start under
    /// [SchedulingPolicy::Clamp].
    pub fn note_off<T: Transport + RoutesSignals + ?Sized>(
        &mut self,
        voice: VoiceUid,
        transport: &mut T,
        time: Seconds,
    ) -> Result<(), VoiceError> {
        self.handle_parameter_changes();
        let index = self
            .voice_index(voice)
            .ok_or(VoiceError::InvalidVoiceHandle(voice))?;
        let previous = self.voices[index].release();
        if previous.is_some_and(|r| r.cause == ReleaseCause::Explicit) {
            return Err(VoiceError::AlreadyReleased(voice));
        }
        let mut time = self.check_time(transport, time)?;
        let start = self.voices[index].start_time();
        if time < start {
            match self.config.scheduling() {
                SchedulingPolicy::Reject => {
                    return Err(VoiceError::Scheduling {
                        requested: time,
                        current: start,
                    })
                }
                SchedulingPolicy::Clamp => {
                    trace!("Clamping note-off at {time} to voice {voice}'s start at {start}");
                    time = start;
                }
            }
        }

        match previous {
            Some(release) if time >= release.start => {
                debug!(
                    "Voice {voice} already releases itself at {}; note-off at {time} changes nothing",
                    release.start
                );
                self.voices[index].set_release(Release {
                    cause: ReleaseCause::Explicit,
                    ..release
                });
            }
            _ => self.release(index, transport, time, ReleaseCause::Explicit),
        }
        Ok(())
    }

    /// Runs a task that was handed to
    /// [Transport::schedule_at()](crate::traits::Transport::schedule_at).
    /// Tasks for voices that are gone, or for releases that were superseded,
    /// are ignored.
    pub fn perform<T: RoutesSignals + ?Sized>(&mut self, task: ScheduledTask, transport: &mut T) {
        match task {
            ScheduledTask::NotifyNoteOn { voice, note } => {
                self.emit(GeneratorEvent::NoteOn { voice, note })
            }
            ScheduledTask::CompleteRelease { voice, generation } => {
                let index = self.voice_index(voice).filter(|i| {
                    self.voices[*i]
                        .release()
                        .is_some_and(|r| r.generation == generation)
                });
                if let Some(index) = index {
                    let voice = self.voices.swap_remove(index);
                    transport.disconnect(voice.stage());
                    debug!("Voice {} off: {}", voice.uid(), voice.note());
                    self.emit(GeneratorEvent::NoteOff {
                        voice: voice.uid(),
                        note: voice.note(),
                    });
                } else {
                    trace!("Ignoring stale completion #{generation} for voice {voice}");
                }
            }
        }
    }

    /// Changes a parameter. Detune changes reach every active voice before
    /// this returns.
    pub fn set_parameter(&mut self, id: ParameterId, value: ParameterType) -> anyhow::Result<()> {
        self.params.set(id, value)?;
        self.handle_parameter_changes();
        Ok(())
    }

    /// Like [Generator::set_parameter()], but by string identifier.
    pub fn set_parameter_by_name(&mut self, name: &str, value: ParameterType) -> anyhow::Result<()> {
        self.params.set_by_name(name, value)?;
        self.handle_parameter_changes();
        Ok(())
    }

    delegate! {
        to self.params {
            /// Returns a channel that receives every subsequent parameter
            /// change.
            #[call(subscribe)]
            pub fn subscribe_to_parameters(&mut self) -> Receiver<ParameterChange>;

            /// The current raw value of a parameter.
            #[call(value)]
            pub fn parameter(&self, id: ParameterId) -> ParameterType;
        }
    }

    /// Returns a channel that receives a [GeneratorEvent] for each voice
    /// that starts or finishes.
    pub fn subscribe(&mut self) -> Receiver<GeneratorEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// The combined pitch offset, in cents: `finetune + 100 × notedetune`.
    pub fn detune(&self) -> ParameterType {
        self.params.value(ParameterId::Finetune) + 100.0 * self.params.value(ParameterId::NoteDetune)
    }

    /// The waveform that the next voice will use.
    pub fn waveform(&self) -> Waveform {
        Waveform::from_repr(self.params.get(ParameterId::Type).index()).unwrap_or_default()
    }

    /// The active voices, including those still releasing. The order isn't
    /// meaningful.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    #[allow(missing_docs)]
    pub fn voice(&self, uid: VoiceUid) -> Option<&Voice> {
        self.voices.iter().find(|v| v.uid() == uid)
    }

    /// How many voices are active. A number that only grows means someone
    /// isn't releasing their sustained notes.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// The most recently triggered note, which is where the next glide
    /// starts from.
    pub fn last_note(&self) -> Option<Note> {
        self.last_note
    }

    #[allow(missing_docs)]
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn voice_index(&self, uid: VoiceUid) -> Option<usize> {
        self.voices.iter().position(|v| v.uid() == uid)
    }

    fn check_time<T: Transport + ?Sized>(
        &self,
        transport: &T,
        time: Seconds,
    ) -> Result<Seconds, VoiceError> {
        let current = transport.current_time();
        let error = VoiceError::Scheduling {
            requested: time,
            current,
        };
        if !time.is_finite() {
            return Err(error);
        }
        if time >= current {
            return Ok(time);
        }
        match self.config.scheduling() {
            SchedulingPolicy::Reject => Err(error),
            SchedulingPolicy::Clamp => {
                trace!("Clamping {time} to {current}");
                Ok(current)
            }
        }
    }

    // The one path for both automatic and explicit releases.
    fn release<T: Transport + ?Sized>(
        &mut self,
        index: usize,
        transport: &mut T,
        time: Seconds,
        cause: ReleaseCause,
    ) {
        let end = time + Seconds::from_millis(self.params.value(ParameterId::Release));
        let stop_at = end + self.config.stop_margin();
        let complete_at = end + self.config.disconnect_margin();

        let voice = &mut self.voices[index];
        let level = voice.stage().gain().cancel_and_hold_at_time(time);
        voice.stage().gain().linear_ramp_to_value_at_time(0.0, end);
        voice.source().stop(stop_at);
        let generation = voice.release().map_or(0, |r| r.generation + 1);
        voice.set_release(Release {
            start: time,
            end,
            cause,
            generation,
        });
        transport.schedule_at(
            complete_at,
            ScheduledTask::CompleteRelease {
                voice: voice.uid(),
                generation,
            },
        );
        debug!(
            "Voice {} releasing ({cause:?}) from {level} at {time}, silent at {end}",
            voice.uid()
        );
    }

    fn handle_parameter_changes(&mut self) {
        let changes: Vec<ParameterChange> = self.parameter_changes.try_iter().collect();
        for change in changes {
            self.on_parameter_changed(change.id, change.value);
        }
    }

    fn emit(&mut self, event: GeneratorEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.send(event).is_ok());
        if self.subscribers.len() != before {
            warn!(
                "Dropped {} event subscriber(s) that stopped listening",
                before - self.subscribers.len()
            );
        }
    }
}
impl ObservesParameters for Generator {
    fn on_parameter_changed(&mut self, id: ParameterId, value: ParameterType) {
        match id {
            ParameterId::Finetune | ParameterId::NoteDetune => {
                let detune = self.detune();
                trace!(
                    "{id} is now {value}; detuning {} voice(s) to {detune} cents",
                    self.voices.len()
                );
                for voice in self.voices.iter() {
                    voice.source().detune().set_value(detune);
                }
            }
            _ => {}
        }
    }
}
