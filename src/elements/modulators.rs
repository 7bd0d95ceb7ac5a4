// Copyright (c) 2024 Mike Tsao

use super::ToneSource;
use crate::{automation::AudioParam, prelude::*};
use core::cell::RefCell;
use std::rc::Rc;

/// The amplitude-control stage that sits between a [ToneSource] and the
/// routing graph. Its gain param carries a voice's envelope.
///
/// Like [ToneSource], an [AmplitudeStage] is a handle, and clones refer to the
/// same primitive.
#[derive(Clone, Debug)]
pub struct AmplitudeStage {
    uid: StageUid,
    gain: AudioParam,
    input: Rc<RefCell<Option<ToneSource>>>,
}
impl AmplitudeStage {
    /// Creates a new stage with unity gain and nothing attached.
    pub fn new_with(uid: StageUid) -> Self {
        Self {
            uid,
            gain: AudioParam::new_with(1.0),
            input: Default::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> StageUid {
        self.uid
    }

    /// The linear gain applied to the attached source.
    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }

    /// Feeds `source` into this stage, replacing any previous input.
    pub fn connect_source(&self, source: &ToneSource) {
        *self.input.borrow_mut() = Some(source.clone());
    }

    /// The source feeding this stage, if any.
    pub fn input(&self) -> Option<ToneSource> {
        self.input.borrow().clone()
    }

    /// Whether the two handles refer to the same primitive.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.input, &other.input)
    }
}
