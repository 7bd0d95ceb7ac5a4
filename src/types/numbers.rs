// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use core::ops::{Add, AddAssign, Mul};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The primitive type of a parameter value.
pub type ParameterType = f64;

/// The primitive Rust type of a single audio sample.
pub type SampleType = f64;

/// [Sample] represents a single-channel audio sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Sample(pub SampleType);
impl Sample {
    /// A [Sample] that is silent.
    pub const SILENCE: Sample = Sample(0.0);
    /// A [Sample] having the maximum positive value.
    pub const MAX: Sample = Sample(1.0);
}
impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample(value)
    }
}
impl Add for Sample {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Sample {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
impl Mul<f64> for Sample {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Frequency is usually measured in hertz (Hz), or cycles per second.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyHz(pub ParameterType);
impl FrequencyHz {
    /// Returns this frequency shifted by the given number of cents (hundredths
    /// of an equal-tempered semitone).
    pub fn detuned_by(&self, cents: ParameterType) -> Self {
        Self(self.0 * 2.0f64.powf(cents / 1200.0))
    }
}
impl From<f64> for FrequencyHz {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<FrequencyHz> for f64 {
    fn from(value: FrequencyHz) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn detune_in_cents() {
        let a4 = FrequencyHz(440.0);
        assert!(approx_eq!(f64, a4.detuned_by(1200.0).0, 880.0, ulps = 4));
        assert!(approx_eq!(f64, a4.detuned_by(-1200.0).0, 220.0, ulps = 4));
        assert_eq!(a4.detuned_by(0.0), a4);
    }

    #[test]
    fn samples_mix() {
        let mut s = Sample(0.25);
        s += Sample(0.5);
        assert_eq!(s, Sample(0.75));
        assert_eq!(Sample::MAX * 0.5, Sample(0.5));
    }
}
