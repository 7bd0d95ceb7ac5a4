// Copyright (c) 2024 Mike Tsao

//! Support for changing the parameters of audio primitives over time in a
//! declarative, reproducible way.
//!
//! The voice engine never computes audio itself. Instead, it issues
//! time-stamped instructions ("be at 0 at t=1.0, ramp to 0.5 by t=1.01") to an
//! [AudioParam], and the renderer evaluates the resulting timeline as it
//! produces samples. Instructions for a single param are always applied as a
//! single continuous timeline. A cancel always precedes new ramps on the same
//! param, so stale future automation never fights with new automation.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{AudioParam, AutomationEvent, AutomationKind};
}

pub use param::{AudioParam, AutomationEvent, AutomationKind};

mod param;
