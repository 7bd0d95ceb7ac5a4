// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use thiserror::Error;

/// Deferred work that the generator hands to
/// [Transport::schedule_at()](crate::traits::Transport::schedule_at). The
/// transport gives it back through
/// [Generator::perform()](super::Generator::perform) when the clock gets
/// there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduledTask {
    /// A voice has started sounding; tell observers.
    NotifyNoteOn {
        #[allow(missing_docs)]
        voice: VoiceUid,
        #[allow(missing_docs)]
        note: Note,
    },
    /// A voice's release has finished. Disconnect it, reclaim it, and tell
    /// observers.
    CompleteRelease {
        #[allow(missing_docs)]
        voice: VoiceUid,
        /// Which of the voice's releases this completes.
        generation: usize,
    },
}

/// Announcements that observers can subscribe to with
/// [Generator::subscribe()](super::Generator::subscribe). Each fires once per
/// voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorEvent {
    /// The voice became audible.
    NoteOn {
        #[allow(missing_docs)]
        voice: VoiceUid,
        #[allow(missing_docs)]
        note: Note,
    },
    /// The voice finished releasing and has been disconnected.
    NoteOff {
        #[allow(missing_docs)]
        voice: VoiceUid,
        #[allow(missing_docs)]
        note: Note,
    },
}

/// Ways that a caller can misuse
/// [Generator::note_on()](super::Generator::note_on) and
/// [Generator::note_off()](super::Generator::note_off).
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum VoiceError {
    /// The handle doesn't name an active voice. Either it never did, or the
    /// voice has already finished releasing.
    #[error("Voice {0} is not active")]
    InvalidVoiceHandle(VoiceUid),

    /// The voice has already been explicitly released.
    #[error("Voice {0} has already been released")]
    AlreadyReleased(VoiceUid),

    /// The requested time is unusable. It isn't a finite number, or it's
    /// earlier than `current`, which is either the transport's clock or the
    /// start of the voice being released.
    #[error("Can't schedule at {requested}s; the earliest allowed time is {current}s")]
    Scheduling {
        #[allow(missing_docs)]
        requested: Seconds,
        #[allow(missing_docs)]
        current: Seconds,
    },
}
