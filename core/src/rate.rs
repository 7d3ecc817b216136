//! Fixed-point accrual rate.
//!
//! Rates are stored as integer micro-grains per second so that the clock
//! can accumulate with integer arithmetic only. On the wire a rate is a
//! plain float in grains per second (e.g. `1.25`).

use crate::error::{HourglassError, HourglassResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Micro-grains per grain.
pub const RATE_SCALE: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccrualRate {
    micro_grains_per_sec: u64,
}

impl AccrualRate {
    /// One grain per second.
    pub const ONE_PER_SECOND: AccrualRate = AccrualRate { micro_grains_per_sec: RATE_SCALE };

    /// Build from grains per second. Fails unless the value is finite and
    /// strictly positive after rounding to the micro-grain grid.
    pub fn from_grains_per_sec(rate: f64) -> HourglassResult<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(HourglassError::invalid(format!(
                "accrual rate must be positive, got {rate}"
            )));
        }
        let scaled = (rate * RATE_SCALE as f64).round();
        if scaled < 1.0 || scaled > u64::MAX as f64 {
            return Err(HourglassError::invalid(format!(
                "accrual rate {rate} is outside the representable range"
            )));
        }
        Ok(Self { micro_grains_per_sec: scaled as u64 })
    }

    pub fn from_micro(micro_grains_per_sec: u64) -> HourglassResult<Self> {
        if micro_grains_per_sec == 0 {
            return Err(HourglassError::invalid("accrual rate must be positive, got 0"));
        }
        Ok(Self { micro_grains_per_sec })
    }

    pub fn micro(&self) -> u64 {
        self.micro_grains_per_sec
    }

    pub fn grains_per_sec(&self) -> f64 {
        self.micro_grains_per_sec as f64 / RATE_SCALE as f64
    }

    /// This rate shifted by `delta` grains per second. The result must stay
    /// positive; `self` is never modified.
    pub fn offset_by(&self, delta: f64) -> HourglassResult<Self> {
        self.shifted(delta_micro(delta)?)
            .ok_or_else(|| HourglassError::invalid(format!(
                "rate {} shifted by {delta} is not a positive rate",
                self.grains_per_sec()
            )))
    }

    /// Swap one offset for another: `self - from + to`, in a single step on
    /// the micro-grain grid, so only the result has to be positive.
    pub fn rebase(&self, from: f64, to: f64) -> HourglassResult<Self> {
        self.shifted(delta_micro(to)? - delta_micro(from)?)
            .ok_or_else(|| HourglassError::invalid(format!(
                "rate {} moved from offset {from} to {to} is not a positive rate",
                self.grains_per_sec()
            )))
    }

    fn shifted(&self, delta_micro: i128) -> Option<Self> {
        let shifted = self.micro_grains_per_sec as i128 + delta_micro;
        if shifted <= 0 || shifted > u64::MAX as i128 {
            return None;
        }
        Some(Self { micro_grains_per_sec: shifted as u64 })
    }
}

fn delta_micro(delta: f64) -> HourglassResult<i128> {
    if !delta.is_finite() {
        return Err(HourglassError::invalid(format!("rate delta must be finite, got {delta}")));
    }
    Ok((delta * RATE_SCALE as f64).round() as i128)
}

impl Default for AccrualRate {
    fn default() -> Self {
        Self::ONE_PER_SECOND
    }
}

impl fmt::Display for AccrualRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}/s", self.grains_per_sec())
    }
}

impl Serialize for AccrualRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.grains_per_sec())
    }
}

impl<'de> Deserialize<'de> for AccrualRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        AccrualRate::from_grains_per_sec(raw).map_err(serde::de::Error::custom)
    }
}
