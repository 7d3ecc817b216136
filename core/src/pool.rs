//! Resource pool — the spendable sand held by one combatant.
//!
//! INVARIANT: 0 <= current <= max, always. Credits past max are dropped,
//! debits that would go negative are refused.

use crate::{
    error::{HourglassError, HourglassResult},
    rate::AccrualRate,
    types::{Grains, ABSOLUTE_MAX_SAND},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcePool {
    current:      Grains,
    max:          Grains,
    accrual_rate: AccrualRate,
}

impl ResourcePool {
    /// `max` must be 1..=ABSOLUTE_MAX_SAND and `initial` no more than `max`.
    pub fn new(max: Grains, initial: Grains, accrual_rate: AccrualRate) -> HourglassResult<Self> {
        if max == 0 || max > ABSOLUTE_MAX_SAND {
            return Err(HourglassError::invalid(format!(
                "max sand must be 1..={ABSOLUTE_MAX_SAND}, got {max}"
            )));
        }
        if initial > max {
            return Err(HourglassError::invalid(format!(
                "initial sand {initial} exceeds max {max}"
            )));
        }
        Ok(Self { current: initial, max, accrual_rate })
    }

    pub fn current(&self) -> Grains { self.current }
    pub fn max(&self) -> Grains { self.max }
    pub fn accrual_rate(&self) -> AccrualRate { self.accrual_rate }

    pub fn headroom(&self) -> Grains {
        self.max - self.current
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Add up to `grains`. Returns how many were actually added.
    pub fn credit(&mut self, grains: Grains) -> Grains {
        let added = grains.min(self.headroom());
        self.current += added;
        added
    }

    /// Take `amount` if there is enough; otherwise leave the pool alone.
    pub fn debit(&mut self, amount: Grains) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn set_accrual_rate(&mut self, rate: f64) -> HourglassResult<()> {
        self.accrual_rate = AccrualRate::from_grains_per_sec(rate)?;
        Ok(())
    }

    pub fn set_rate(&mut self, rate: AccrualRate) {
        self.accrual_rate = rate;
    }

    /// Clamped assignment, for combat setup and debug tools.
    pub fn set_current(&mut self, amount: Grains) {
        let old = self.current;
        self.current = amount.min(self.max);
        log::debug!("pool: sand set {old} -> {}", self.current);
    }

    /// Raise capacity (buff effects). Refused if it would pass the hard ceiling.
    pub fn increase_max(&mut self, amount: Grains) -> bool {
        let new_max = match self.max.checked_add(amount) {
            Some(m) if m <= ABSOLUTE_MAX_SAND => m,
            _ => return false,
        };
        log::info!("pool: max sand increased {} -> {new_max}", self.max);
        self.max = new_max;
        true
    }
}
