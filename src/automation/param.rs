// Copyright (c) 2024 Mike Tsao

use crate::types::{ParameterType, Seconds};
use core::cell::RefCell;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// How the value arrives at an [AutomationEvent]'s target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomationKind {
    /// The value jumps to the target at the event's time.
    SetValue,
    /// The value moves linearly from the previous event's value, arriving at
    /// the target at the event's time.
    LinearRamp,
}

/// A single instruction on an [AudioParam]'s timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutomationEvent {
    /// The time at which the param should have the given value.
    pub when: Seconds,
    /// The value the param should have at the given time.
    pub value: ParameterType,
    /// How the param gets there.
    pub kind: AutomationKind,
}

// Events are always ordered by time.
#[derive(Debug, Default)]
struct AutomationTimeline {
    value: ParameterType,
    events: Vec<AutomationEvent>,
}
impl AutomationTimeline {
    fn insert(&mut self, event: AutomationEvent) {
        // Events at the same time keep the order they were issued in.
        let index = self.events.partition_point(|e| e.when <= event.when);
        self.events.insert(index, event);
    }

    fn value_at(&self, when: Seconds) -> ParameterType {
        let next_index = self.events.partition_point(|e| e.when <= when);
        let previous = next_index.checked_sub(1).map(|i| &self.events[i]);
        match (previous, self.events.get(next_index)) {
            (previous, Some(next)) if next.kind == AutomationKind::LinearRamp => {
                let (start_when, start_value) = previous
                    .map(|p| (p.when, p.value))
                    .unwrap_or((Seconds::ZERO, self.value));
                let span = (next.when - start_when).0;
                if span <= 0.0 {
                    return next.value;
                }
                let percent = (when - start_when).0 / span;
                start_value + (next.value - start_value) * percent
            }
            (Some(previous), _) => previous.value,
            (None, _) => self.value,
        }
    }
}

/// A shared, automatable control value, such as an oscillator's frequency or
/// an amplifier's gain.
///
/// An [AudioParam] doesn't render anything. It records declarative,
/// time-stamped instructions that a renderer evaluates later with
/// [AudioParam::value_at()]. Cloning an [AudioParam] produces another handle
/// to the same timeline, which is how a renderer keeps its own reference to a
/// primitive that a voice owns.
#[derive(Clone, Debug, Default)]
pub struct AudioParam(Rc<RefCell<AutomationTimeline>>);
impl AudioParam {
    /// Creates a param whose intrinsic value is `value`.
    pub fn new_with(value: ParameterType) -> Self {
        Self(Rc::new(RefCell::new(AutomationTimeline {
            value,
            events: Vec::default(),
        })))
    }

    /// The intrinsic value, which applies wherever no event governs the
    /// timeline.
    pub fn value(&self) -> ParameterType {
        self.0.borrow().value
    }

    /// Sets the intrinsic value. Takes effect immediately wherever no
    /// scheduled event governs the timeline.
    pub fn set_value(&self, value: ParameterType) {
        self.0.borrow_mut().value = value;
    }

    /// Jumps to `value` at `when`.
    pub fn set_value_at_time(&self, value: ParameterType, when: Seconds) {
        self.0.borrow_mut().insert(AutomationEvent {
            when,
            value,
            kind: AutomationKind::SetValue,
        });
    }

    /// Moves linearly from the previous event's value, reaching `value` at
    /// `when`.
    pub fn linear_ramp_to_value_at_time(&self, value: ParameterType, when: Seconds) {
        self.0.borrow_mut().insert(AutomationEvent {
            when,
            value,
            kind: AutomationKind::LinearRamp,
        });
    }

    /// Discards every event at or after `when`.
    pub fn cancel_scheduled_values(&self, when: Seconds) {
        self.0.borrow_mut().events.retain(|e| e.when < when);
    }

    /// Discards every event at or after `when`, but first captures the value
    /// the timeline would have had at `when` and pins it there. The curve up to
    /// `when` is unchanged, so anything scheduled afterward starts from the
    /// level that was actually sounding. Returns the captured value.
    pub fn cancel_and_hold_at_time(&self, when: Seconds) -> ParameterType {
        let mut timeline = self.0.borrow_mut();
        let held = timeline.value_at(when);
        let ramp_in_progress = timeline
            .events
            .iter()
            .find(|e| e.when >= when)
            .is_some_and(|e| e.kind == AutomationKind::LinearRamp);
        timeline.events.retain(|e| e.when < when);
        timeline.insert(AutomationEvent {
            when,
            value: held,
            kind: if ramp_in_progress {
                AutomationKind::LinearRamp
            } else {
                AutomationKind::SetValue
            },
        });
        held
    }

    /// Evaluates the timeline at `when`.
    pub fn value_at(&self, when: Seconds) -> ParameterType {
        self.0.borrow().value_at(when)
    }

    /// A copy of the scheduled events, in time order.
    pub fn events(&self) -> Vec<AutomationEvent> {
        self.0.borrow().events.clone()
    }

    /// Whether the two handles refer to the same timeline.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
