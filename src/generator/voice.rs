// Copyright (c) 2024 Mike Tsao

use crate::{
    elements::{AmplitudeStage, ToneSource},
    prelude::*,
};

/// Why a voice started releasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseCause {
    /// The voice wasn't sustained, so it released itself at the end of decay.
    Automatic,
    /// Someone called [Generator::note_off()](super::Generator::note_off).
    Explicit,
}

/// The release that a voice has been programmed with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Release {
    /// When the ramp to silence begins.
    pub start: Seconds,
    /// When the ramp reaches silence.
    pub end: Seconds,
    #[allow(missing_docs)]
    pub cause: ReleaseCause,
    /// Bumped each time the voice is reprogrammed, so that completion tasks
    /// for an abandoned release can be recognized and ignored.
    pub generation: usize,
}

/// One sounding instance of a note: a [ToneSource] feeding an
/// [AmplitudeStage], plus the times its envelope was built from.
///
/// The envelope shape is frozen when the voice is created. Later edits to
/// attack or decay don't reach voices that already exist.
#[derive(Debug)]
pub struct Voice {
    uid: VoiceUid,
    note: Note,
    source: ToneSource,
    stage: AmplitudeStage,
    start_time: Seconds,
    attack_end_time: Seconds,
    decay_end_time: Seconds,
    release: Option<Release>,
}
#[allow(missing_docs)]
impl Voice {
    pub(crate) fn new_with(
        uid: VoiceUid,
        note: Note,
        source: ToneSource,
        stage: AmplitudeStage,
        start_time: Seconds,
        attack_end_time: Seconds,
        decay_end_time: Seconds,
    ) -> Self {
        Self {
            uid,
            note,
            source,
            stage,
            start_time,
            attack_end_time,
            decay_end_time,
            release: None,
        }
    }

    pub fn uid(&self) -> VoiceUid {
        self.uid
    }

    pub fn note(&self) -> Note {
        self.note
    }

    pub fn source(&self) -> &ToneSource {
        &self.source
    }

    pub fn stage(&self) -> &AmplitudeStage {
        &self.stage
    }

    /// When the note began sounding.
    pub fn start_time(&self) -> Seconds {
        self.start_time
    }

    /// When the envelope reaches its peak.
    pub fn attack_end_time(&self) -> Seconds {
        self.attack_end_time
    }

    /// When the envelope settles on its decay level.
    pub fn decay_end_time(&self) -> Seconds {
        self.decay_end_time
    }

    /// The release this voice has been programmed with, if any.
    pub fn release(&self) -> Option<Release> {
        self.release
    }

    pub fn is_releasing(&self) -> bool {
        self.release.is_some()
    }

    pub(crate) fn set_release(&mut self, release: Release) {
        self.release = Some(release);
    }
}
