// Copyright (c) 2024 Mike Tsao

use core::ops::{Add, Mul, Sub};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of time.
///
/// [Seconds] serves both as an absolute position on the transport's clock and
/// as a duration. The transport's clock is opaque except that it's monotonic,
/// so nothing here knows about wall-clock time.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const ZERO: Seconds = Seconds(0.0);

    /// Converts milliseconds, which is how envelope parameters are stored.
    pub fn from_millis(millis: f64) -> Self {
        Self(millis / 1000.0)
    }

    /// Whether this is a usable point in time (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Returns the later of the two times.
    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }
}
impl From<f64> for Seconds {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.0
    }
}
impl Add for Seconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl Sub for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl Mul<f64> for Seconds {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Samples per second. Always a positive integer; cannot be zero.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 44100;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }

    /// The duration of a single frame at this rate.
    pub fn frame_duration(&self) -> Seconds {
        Seconds(1.0 / self.0 as f64)
    }
}
impl Default for SampleRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}
impl From<usize> for SampleRate {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_arithmetic() {
        let start = Seconds(1.5);
        assert_eq!(start + Seconds(0.5), Seconds(2.0));
        assert_eq!(start - Seconds(0.5), Seconds(1.0));
        assert_eq!(Seconds(2.0) * 0.25, Seconds(0.5));
        assert_eq!(Seconds::from_millis(250.0), Seconds(0.25));
        assert_eq!(f64::from(Seconds::from(1.5)), 1.5);
        assert_eq!(Seconds(1.0).max(Seconds(3.0)), Seconds(3.0));
        assert!(!Seconds(f64::NAN).is_finite());
    }

    #[test]
    fn sample_rate_is_never_zero() {
        assert_eq!(SampleRate::new(0), SampleRate::DEFAULT);
        assert_eq!(SampleRate::from(48000).0, 48000);
    }
}
