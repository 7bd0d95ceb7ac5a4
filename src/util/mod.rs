// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::settings::{GeneratorConfig, GeneratorConfigBuilder, SchedulingPolicy};
}

pub use settings::{GeneratorConfig, GeneratorConfigBuilder, SchedulingPolicy};

mod settings;
