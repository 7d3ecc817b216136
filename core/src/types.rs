//! Shared primitive types used across the whole hourglass.

use serde::{Deserialize, Serialize};

/// A count of sand grains. One grain = one unit of spendable initiative.
pub type Grains = u32;

/// A campaign hour, 1..=12.
pub type Hour = u8;

/// A stable identifier for one combat session.
pub type SessionId = String;

/// Default pool capacity for a fresh combatant.
pub const DEFAULT_MAX_SAND: Grains = 6;

/// Default sand a combatant starts a combat with.
pub const DEFAULT_INITIAL_SAND: Grains = 3;

/// Hard ceiling for pool capacity, even with buffs.
pub const ABSOLUTE_MAX_SAND: Grains = 8;

pub const FIRST_HOUR: Hour = 1;
pub const FINAL_HOUR: Hour = 12;

/// Which side of the table a combatant sits on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy  => "enemy",
        }
    }
}
