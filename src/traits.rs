// Copyright (c) 2024 Mike Tsao

//! The traits that define the relationships between the voice engine and the
//! collaborators it programs against.

use crate::{
    elements::{AmplitudeStage, ToneSource},
    generator::{ParameterId, ScheduledTask},
    prelude::*,
};

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{Configurable, Generates, ObservesParameters, RoutesSignals, Transport};
}

/// A [Transport] owns the audio clock. It tells the engine what time it is,
/// runs deferred work at a future time, and manufactures the audio primitives
/// that the renderer knows how to play.
///
/// The clock value is opaque. The engine never measures time itself; it only
/// asks the transport and then does arithmetic on the answers.
pub trait Transport {
    /// The current position of the audio clock. Never decreases.
    fn current_time(&self) -> Seconds;

    /// Asks the transport to hand `task` back to the engine (via
    /// [Generator::perform()](crate::generator::Generator::perform)) once the
    /// clock reaches `when`. Fire-and-forget: there is no way to cancel.
    fn schedule_at(&mut self, when: Seconds, task: ScheduledTask);

    /// Creates a new, silent, unstarted [ToneSource].
    fn create_source(&mut self) -> ToneSource;

    /// Creates a new [AmplitudeStage] with nothing attached.
    fn create_amplitude_stage(&mut self) -> AmplitudeStage;
}

/// The routing graph. Connects amplitude stages to the places their signal
/// should go.
pub trait RoutesSignals {
    /// Routes `stage`'s output to `destination`.
    fn connect(&mut self, stage: &AmplitudeStage, destination: Destination);

    /// Removes `stage` from the graph. Disconnecting a stage that isn't
    /// connected does nothing.
    fn disconnect(&mut self, stage: &AmplitudeStage);
}

/// Something that wants to hear about parameter edits as they happen.
pub trait ObservesParameters {
    /// The parameter `id` now has `value`.
    fn on_parameter_changed(&mut self, id: ParameterId, value: ParameterType);
}

/// Something that is [Configurable] is interested in staying in sync with
/// global configuration.
pub trait Configurable {
    /// Returns this item's sample rate.
    fn sample_rate(&self) -> SampleRate {
        SampleRate::DEFAULT
    }

    /// The sample rate changed.
    #[allow(unused_variables)]
    fn update_sample_rate(&mut self, sample_rate: SampleRate) {}

    /// Sent to indicate that it's time to reset internal state. Oscillators
    /// should reset phase, etc.
    fn reset(&mut self) {}
}

/// Something that [Generates] creates the given type `V` as its work product
/// over time. Examples are envelopes, which produce a gain value, and
/// renderers, which produce audio samples.
pub trait Generates<V: Default + Clone>: core::fmt::Debug + Configurable {
    /// Fills a batch of values with new signal. Returns true if the signal was
    /// non-default; for example, in the case of a [Sample] signal, returns true
    /// if any part of the generated signal was non-silent.
    fn generate(&mut self, values: &mut [V]) -> bool {
        values.fill(V::default());
        false
    }
}
