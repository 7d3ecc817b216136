//! Hourglass clock — turns frame time into whole sand grains.
//!
//! All accumulation is integer: frame time is rounded once to whole
//! nanoseconds and multiplied by the time scale and the rate, both in
//! millionths. One grain is therefore `GRAIN_UNITS` accumulator units, and
//! the same total time always yields the same grains, however it is split
//! into frames.

use crate::{
    error::{HourglassError, HourglassResult},
    rate::{AccrualRate, RATE_SCALE},
    types::Grains,
};
use serde::{Deserialize, Serialize};

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Accumulator units in one grain (nanoseconds × micro-scale × micro-grains/s).
pub const GRAIN_UNITS: u128 = NANOS_PER_SEC as u128 * RATE_SCALE as u128 * RATE_SCALE as u128;

/// Clamped time above this is worth a warning.
const CLAMP_WARN_NANOS: u64 = 50_000_000;

/// Frame handling knobs. Both default to "off".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClockSettings {
    /// Longest single frame, in seconds. Longer frames are cut to this.
    #[serde(default)]
    pub max_frame_delta: Option<f64>,
    /// Debug speed multiplier, applied after clamping.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_time_scale() -> f64 { 1.0 }

impl Default for ClockSettings {
    fn default() -> Self {
        Self { max_frame_delta: None, time_scale: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourglassClock {
    /// Sub-grain remainder, in accumulator units (always < GRAIN_UNITS).
    accumulated: u128,
    paused: bool,
    max_frame_nanos: Option<u64>,
    time_scale_micro: u64,
}

impl Default for HourglassClock {
    fn default() -> Self {
        Self {
            accumulated: 0,
            paused: false,
            max_frame_nanos: None,
            time_scale_micro: RATE_SCALE,
        }
    }
}

impl HourglassClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ClockSettings) -> HourglassResult<Self> {
        let mut clock = Self::default();
        if let Some(max) = settings.max_frame_delta {
            let nanos = seconds_to_nanos(max)?;
            if nanos == 0 {
                return Err(HourglassError::invalid("max_frame_delta must be positive"));
            }
            clock.max_frame_nanos = Some(nanos);
        }
        clock.set_time_scale(settings.time_scale)?;
        Ok(clock)
    }

    /// Advance by one frame at `rate`. Returns the whole grains produced.
    ///
    /// A paused clock returns 0 and keeps its remainder untouched.
    pub fn advance(&mut self, delta_seconds: f64, rate: AccrualRate) -> HourglassResult<Grains> {
        let nanos = seconds_to_nanos(delta_seconds)?;
        Ok(self.advance_nanos(nanos, rate))
    }

    pub fn advance_nanos(&mut self, nanos: u64, rate: AccrualRate) -> Grains {
        if self.paused || nanos == 0 {
            return 0;
        }

        let clamped = match self.max_frame_nanos {
            Some(max) if nanos > max => {
                let dropped = nanos - max;
                if dropped > CLAMP_WARN_NANOS {
                    log::warn!(
                        "clock: frame clamped, dropped {:.1}ms",
                        dropped as f64 / 1_000_000.0
                    );
                }
                max
            }
            _ => nanos,
        };

        let units = (clamped as u128)
            .saturating_mul(self.time_scale_micro as u128)
            .saturating_mul(rate.micro() as u128);
        self.accumulated = self.accumulated.saturating_add(units);

        let whole = self.accumulated / GRAIN_UNITS;
        self.accumulated %= GRAIN_UNITS;
        Grains::try_from(whole).unwrap_or(Grains::MAX)
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Start-of-combat reset: empty remainder, running.
    pub fn reset(&mut self) {
        self.accumulated = 0;
        self.paused = false;
    }

    /// Accrued but unconverted sand, in grains (0.0..1.0).
    pub fn elapsed_unaccounted(&self) -> f64 {
        self.accumulated as f64 / GRAIN_UNITS as f64
    }

    /// Unscaled seconds of running time until the next whole grain.
    pub fn time_to_next_grain(&self, rate: AccrualRate) -> f64 {
        let missing = GRAIN_UNITS - self.accumulated;
        let per_sec = NANOS_PER_SEC as u128
            * rate.micro() as u128
            * self.time_scale_micro as u128;
        missing as f64 / per_sec as f64
    }

    pub fn set_time_scale(&mut self, scale: f64) -> HourglassResult<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(HourglassError::invalid(format!("time scale must be positive, got {scale}")));
        }
        let micro = (scale * RATE_SCALE as f64).round();
        if micro < 1.0 || micro > u64::MAX as f64 {
            return Err(HourglassError::invalid(format!("time scale {scale} is out of range")));
        }
        self.time_scale_micro = micro as u64;
        log::debug!("clock: time scale set to {scale}x");
        Ok(())
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale_micro as f64 / RATE_SCALE as f64
    }
}

/// Validate and round a frame delta to whole nanoseconds.
pub fn seconds_to_nanos(delta_seconds: f64) -> HourglassResult<u64> {
    if delta_seconds.is_nan() || delta_seconds < 0.0 {
        return Err(HourglassError::invalid(format!(
            "delta_seconds must be non-negative, got {delta_seconds}"
        )));
    }
    let nanos = (delta_seconds * NANOS_PER_SEC as f64).round();
    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(HourglassError::invalid(format!(
            "delta_seconds {delta_seconds} is too large"
        )));
    }
    Ok(nanos as u64)
}
