// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::prelude::*;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// What to do when a caller asks for something to happen before the
/// transport's current time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulingPolicy {
    /// Refuse with [VoiceError::Scheduling](crate::generator::VoiceError).
    #[default]
    Reject,
    /// Move the request up to the transport's current time.
    Clamp,
}

/// Configures a [Generator](crate::generator::Generator).
#[derive(Clone, Debug, Derivative, Builder, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct GeneratorConfig {
    /// Where voices are routed.
    destination: Destination,

    /// How long after its release ends a voice's source keeps running, so
    /// that any ringing tail is never cut short.
    #[derivative(Default(value = "Seconds(1.0)"))]
    stop_margin: Seconds,

    /// How long after its release ends a voice is disconnected and reclaimed.
    /// Gives the ramp to silence time to land, so the cut doesn't click.
    #[derivative(Default(value = "Seconds(0.1)"))]
    disconnect_margin: Seconds,

    /// How to handle requests for times already in the past.
    scheduling: SchedulingPolicy,
}
impl GeneratorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        for (name, margin) in [
            ("stop_margin", self.stop_margin),
            ("disconnect_margin", self.disconnect_margin),
        ] {
            if let Some(margin) = margin {
                if !margin.is_finite() || margin.0 < 0.0 {
                    return Err(format!("{name} must be a non-negative number of seconds"));
                }
            }
        }
        Ok(())
    }
}
#[allow(missing_docs)]
impl GeneratorConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        for margin in [config.stop_margin, config.disconnect_margin] {
            if !margin.is_finite() || margin.0 < 0.0 {
                return Err(anyhow::anyhow!("margin {margin} must be non-negative"));
            }
        }
        Ok(config)
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn stop_margin(&self) -> Seconds {
        self.stop_margin
    }

    pub fn disconnect_margin(&self) -> Seconds {
        self.disconnect_margin
    }

    pub fn scheduling(&self) -> SchedulingPolicy {
        self.scheduling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.destination(), Destination(0));
        assert_eq!(config.stop_margin(), Seconds(1.0));
        assert_eq!(config.disconnect_margin(), Seconds(0.1));
        assert_eq!(config.scheduling(), SchedulingPolicy::Reject);
        assert_eq!(GeneratorConfigBuilder::default().build().unwrap(), config);
    }

    #[test]
    fn builder_validates_margins() {
        let config = GeneratorConfigBuilder::default()
            .scheduling(SchedulingPolicy::Clamp)
            .destination(Destination(3))
            .build()
            .unwrap();
        assert_eq!(config.scheduling(), SchedulingPolicy::Clamp);
        assert_eq!(config.destination(), Destination(3));
        assert_eq!(config.stop_margin(), Seconds(1.0), "untouched fields default");

        assert!(GeneratorConfigBuilder::default()
            .stop_margin(Seconds(-1.0))
            .build()
            .is_err());
    }

    #[test]
    fn loads_from_json() {
        let config =
            GeneratorConfig::from_json_str(r#"{ "scheduling": "clamp", "stop-margin": 0.5 }"#)
                .unwrap();
        assert_eq!(config.scheduling(), SchedulingPolicy::Clamp);
        assert_eq!(config.stop_margin(), Seconds(0.5));
        assert_eq!(config.disconnect_margin(), Seconds(0.1));

        assert!(GeneratorConfig::from_json_str(r#"{ "disconnect-margin": -2.0 }"#).is_err());
        assert!(GeneratorConfig::from_json_str("not json").is_err());
    }
}
