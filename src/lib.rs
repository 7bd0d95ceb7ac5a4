// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! A polyphonic tone generator for the Ensnare family of music crates.
//!
//! The [Generator] doesn't compute audio. It programs declarative,
//! time-stamped automation onto audio primitives that a
//! [Transport](traits::Transport) supplies, and a renderer turns that
//! automation into sound.
//!
//! * Use [OfflineTransport](elements::OfflineTransport) to drive a
//! [Generator] without an audio device: it keeps the clock, runs deferred
//! tasks, and renders samples.
//! * Implement [Transport](traits::Transport) and
//! [RoutesSignals](traits::RoutesSignals) to drive a [Generator] from a real
//! audio backend.
//!
//! ```
//! use ensnare_generator::prelude::*;
//!
//! let mut transport = OfflineTransport::default();
//! let mut generator = Generator::default();
//! let voice = generator
//!     .note_on("C4".parse().unwrap(), &mut transport, Seconds::ZERO)
//!     .unwrap();
//! assert!(generator.note_off(voice, &mut transport, Seconds(1.0)).is_ok());
//! transport.run_until(Seconds(2.0), &mut generator);
//! assert_eq!(generator.voice_count(), 0);
//! ```

/// A collection of imports that are useful to users of this crate. `use
/// ensnare_generator::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        automation::prelude::*, elements::prelude::*, generator::prelude::*, traits::prelude::*,
        types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use generator::Generator;

pub mod automation;
pub mod elements;
pub mod generator;
pub mod traits;
pub mod types;
pub mod util;
