//! Snapshot serialization — the player's hourglass state to/from JSON.
//!
//! A snapshot is exactly four values. Everything else (hour table, clock
//! settings) is configuration and is supplied again on restore. The
//! sub-grain clock remainder is not saved: snapshots are taken between
//! combats, where the clock is reset anyway.

use crate::{
    clock::{ClockSettings, HourglassClock},
    combatant::Combatant,
    error::HourglassResult,
    pool::ResourcePool,
    progression::{HourProgression, HourTable},
    rate::AccrualRate,
    types::{Grains, Hour, Side},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourglassSnapshot {
    pub current:      Grains,
    pub max:          Grains,
    pub accrual_rate: AccrualRate,
    pub current_hour: Hour,
}

impl HourglassSnapshot {
    pub fn capture(combatant: &Combatant, progression: &HourProgression) -> Self {
        let pool = combatant.pool();
        Self {
            current:      pool.current(),
            max:          pool.max(),
            accrual_rate: pool.accrual_rate(),
            current_hour: progression.current_hour(),
        }
    }

    /// Rebuild the player combatant and the campaign progression.
    pub fn restore(
        &self,
        table: HourTable,
        clock: ClockSettings,
    ) -> HourglassResult<(Combatant, HourProgression)> {
        let pool = ResourcePool::new(self.max, self.current, self.accrual_rate)?;
        let progression = HourProgression::at_hour(table, self.current_hour)?;
        let combatant = Combatant::from_parts(
            Side::Player,
            pool,
            HourglassClock::with_settings(clock)?,
        );
        Ok((combatant, progression))
    }

    pub fn to_json(&self) -> HourglassResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> HourglassResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
