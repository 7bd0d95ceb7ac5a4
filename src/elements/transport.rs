// Copyright (c) 2024 Mike Tsao

use super::{AmplitudeStage, ToneSource};
use crate::{
    generator::{Generator, ScheduledTask},
    prelude::*,
};
use log::trace;
use std::collections::{HashMap, VecDeque};

/// [OfflineTransport] is a complete, single-threaded stand-in for a real-time
/// audio backend. It keeps the clock, queues one-shot tasks, manufactures
/// primitives, keeps the routing table, and renders whatever is connected.
///
/// Time moves only when asked. [OfflineTransport::run_until()] advances the
/// clock and hands due tasks to a [Generator];
/// [Generates::generate()] renders from the current time onward.
#[derive(Debug, Default)]
pub struct OfflineTransport {
    current_time: Seconds,
    queue: VecDeque<(Seconds, ScheduledTask)>,
    stage_uid_factory: UidFactory<StageUid>,
    routes: Vec<(AmplitudeStage, Destination)>,
    sample_rate: SampleRate,

    e: OfflineTransportEphemerals,
}
/// Rendering state that is rebuilt as needed.
#[derive(Debug, Default)]
struct OfflineTransportEphemerals {
    /// Oscillator phase, 0.0..1.0, for each connected stage's source.
    phases: HashMap<StageUid, f64>,
    rendered_frames: usize,

    /// Where rendering last picked up. The clock while rendering is always
    /// this plus a whole number of frames, so it doesn't drift.
    render_origin: Seconds,
    frames_since_origin: usize,
}
impl OfflineTransport {
    #[allow(missing_docs)]
    pub fn new_with(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Tasks that haven't run yet, in the order they will run.
    pub fn pending_tasks(&self) -> impl Iterator<Item = &(Seconds, ScheduledTask)> {
        self.queue.iter()
    }

    /// When the next task is due, if there is one.
    pub fn next_task_time(&self) -> Option<Seconds> {
        self.queue.front().map(|(when, _)| *when)
    }

    /// Advances the clock to `until`, running every task due by then in time
    /// order. Tasks due at the same time run in the order they were
    /// scheduled. Returns how many tasks ran.
    pub fn run_until(&mut self, until: Seconds, generator: &mut Generator) -> usize {
        let mut count = 0;
        while self.next_task_time().is_some_and(|when| when <= until) {
            if let Some((when, task)) = self.queue.pop_front() {
                self.current_time = self.current_time.max(when);
                trace!("Running {task:?} at {when}");
                generator.perform(task, self);
                count += 1;
            }
        }
        self.current_time = self.current_time.max(until);
        count
    }

    /// Like [Generates::generate()], but runs each task as the rendering
    /// reaches it, so voices are disconnected exactly when they're
    /// scheduled to be.
    pub fn render(&mut self, generator: &mut Generator, values: &mut [Sample]) -> bool {
        let mut is_audible = false;
        for value in values.iter_mut() {
            let when = self.current_time;
            self.run_until(when, generator);
            *value = self.render_frame(when);
            is_audible |= *value != Sample::SILENCE;
            self.advance_one_frame();
        }
        is_audible
    }

    /// The stages currently in the routing table, with their destinations.
    pub fn routes(&self) -> impl Iterator<Item = &(AmplitudeStage, Destination)> {
        self.routes.iter()
    }

    /// Whether `stage` is in the routing table.
    pub fn is_connected(&self, stage: &AmplitudeStage) -> bool {
        self.routes.iter().any(|(s, _)| s.ptr_eq(stage))
    }

    /// How many frames have been rendered since the last reset.
    pub fn rendered_frames(&self) -> usize {
        self.e.rendered_frames
    }

    fn render_frame(&mut self, when: Seconds) -> Sample {
        let frame_duration = self.sample_rate.frame_duration().0;
        let mut sum = Sample::SILENCE;
        for (stage, _) in self.routes.iter() {
            let Some(source) = stage.input() else {
                continue;
            };
            if !source.is_sounding_at(when) {
                continue;
            }
            let phase = self.e.phases.entry(stage.uid()).or_default();
            sum += Sample(source.waveform().amplitude_at(*phase) * stage.gain().value_at(when));
            *phase = (*phase + source.effective_frequency_at(when).0 * frame_duration).rem_euclid(1.0);
        }
        sum
    }

    fn advance_one_frame(&mut self) {
        if self.current_time != self.frame_position() {
            // Something other than rendering moved the clock.
            self.e.render_origin = self.current_time;
            self.e.frames_since_origin = 0;
        }
        self.e.rendered_frames += 1;
        self.e.frames_since_origin += 1;
        self.current_time = self.frame_position();
    }

    fn frame_position(&self) -> Seconds {
        self.e.render_origin
            + Seconds(self.e.frames_since_origin as f64 / self.sample_rate.0 as f64)
    }
}
impl Transport for OfflineTransport {
    fn current_time(&self) -> Seconds {
        self.current_time
    }

    fn schedule_at(&mut self, when: Seconds, task: ScheduledTask) {
        let index = self.queue.partition_point(|(w, _)| *w <= when);
        self.queue.insert(index, (when, task));
    }

    fn create_source(&mut self) -> ToneSource {
        ToneSource::new_with(self.stage_uid_factory.mint_next())
    }

    fn create_amplitude_stage(&mut self) -> AmplitudeStage {
        AmplitudeStage::new_with(self.stage_uid_factory.mint_next())
    }
}
impl RoutesSignals for OfflineTransport {
    fn connect(&mut self, stage: &AmplitudeStage, destination: Destination) {
        self.disconnect(stage);
        self.routes.push((stage.clone(), destination));
    }

    fn disconnect(&mut self, stage: &AmplitudeStage) {
        self.routes.retain(|(s, _)| !s.ptr_eq(stage));
        self.e.phases.remove(&stage.uid());
    }
}
impl Configurable for OfflineTransport {
    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.sample_rate = sample_rate;
        self.e.render_origin = self.current_time;
        self.e.frames_since_origin = 0;
    }

    fn reset(&mut self) {
        self.e = Default::default();
    }
}
impl Generates<Sample> for OfflineTransport {
    /// Renders from the current time, advancing the clock one frame per
    /// value. Doesn't run tasks; see [OfflineTransport::render()] for that.
    fn generate(&mut self, values: &mut [Sample]) -> bool {
        let mut is_audible = false;
        for value in values.iter_mut() {
            *value = self.render_frame(self.current_time);
            is_audible |= *value != Sample::SILENCE;
            self.advance_one_frame();
        }
        is_audible
    }
}
