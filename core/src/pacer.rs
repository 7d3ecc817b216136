//! Turn pacer — holds accrual still while something blocking plays out.
//!
//! Blocking intervals nest: the clock is paused on the first begin and
//! resumed only when the matching last end arrives. The pacer owns its
//! clock so nothing else can resume it mid-interval.

use crate::{
    clock::HourglassClock,
    error::{HourglassError, HourglassResult},
    rate::AccrualRate,
    types::Grains,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PacerState {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnPacer {
    clock: HourglassClock,
    depth: u32,
}

impl TurnPacer {
    pub fn new(clock: HourglassClock) -> Self {
        Self { clock, depth: 0 }
    }

    pub fn state(&self) -> PacerState {
        if self.depth == 0 { PacerState::Running } else { PacerState::Paused }
    }

    /// Open a blocking interval. Returns the nesting depth after the call.
    pub fn begin_blocking_interval(&mut self) -> u32 {
        if self.depth == 0 {
            self.clock.pause();
        }
        self.depth += 1;
        self.depth
    }

    /// Close a blocking interval. Returns the nesting depth after the call.
    pub fn end_blocking_interval(&mut self) -> HourglassResult<u32> {
        if self.depth == 0 {
            return Err(HourglassError::Logic(
                "end_blocking_interval without a matching begin".into(),
            ));
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.clock.resume();
        }
        Ok(self.depth)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn advance(&mut self, delta_seconds: f64, rate: AccrualRate) -> HourglassResult<Grains> {
        self.clock.advance(delta_seconds, rate)
    }

    pub fn clock(&self) -> &HourglassClock {
        &self.clock
    }

    /// Start-of-combat reset. Any open intervals are dropped.
    pub fn reset(&mut self) {
        if self.depth > 0 {
            log::warn!("pacer: reset with {} blocking interval(s) still open", self.depth);
        }
        self.depth = 0;
        self.clock.reset();
    }
}
