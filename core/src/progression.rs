//! Hour progression — the twelve hours of the underworld journey.
//!
//! The campaign starts at hour 1 and only moves forward. Each hour has a
//! fixed set of balance modifiers; entering an hour swaps the old hour's
//! accrual delta for the new one on the player's pool and may hand out a
//! reward.
//!
//! The pool's rate is the only stored rate. The hour-free base is always
//! derived from it, so a rate set directly on the pool carries through
//! later hours and through a snapshot.
//!
//! Rewards are only described here. Granting cards, slots or titles is the
//! collection system's job.
//!
//! Depends on: ResourcePool (accrual rate only, one-directional).

use crate::{
    error::{HourglassError, HourglassResult},
    pool::ResourcePool,
    rate::AccrualRate,
    types::{Hour, FINAL_HOUR, FIRST_HOUR},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    Accrual,
    Draw,
    Damage,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct HourModifiers {
    /// Added to the base accrual rate, grains per second.
    #[serde(default)]
    pub accrual_delta: f64,
    /// Extra cards drawn per turn.
    #[serde(default)]
    pub draw_delta: f64,
    /// Fractional damage bonus (0.25 = +25%).
    #[serde(default)]
    pub damage_delta: f64,
}

impl HourModifiers {
    pub fn get(&self, kind: ModifierKind) -> f64 {
        match kind {
            ModifierKind::Accrual => self.accrual_delta,
            ModifierKind::Draw    => self.draw_delta,
            ModifierKind::Damage  => self.damage_delta,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    CardPack,
    Cards,
    DeckSlot,
    ChamberUnlock,
    Title,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RewardRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// What the collection system should grant on entering an hour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardDescriptor {
    pub kind:     RewardKind,
    pub id:       String,
    pub rarity:   RewardRarity,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 { 1 }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourEntry {
    pub hour: Hour,
    pub name: String,
    #[serde(flatten)]
    pub modifiers: HourModifiers,
    #[serde(default)]
    pub reward: Option<RewardDescriptor>,
}

/// Immutable hour → modifiers/reward lookup. Hours without an entry have
/// no modifiers and no reward.
#[derive(Debug, Clone, PartialEq)]
pub struct HourTable {
    entries: BTreeMap<Hour, HourEntry>,
}

impl HourTable {
    pub fn from_entries(entries: Vec<HourEntry>) -> HourglassResult<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            if !(FIRST_HOUR..=FINAL_HOUR).contains(&entry.hour) {
                return Err(HourglassError::invalid(format!(
                    "hour table entry {} outside {FIRST_HOUR}..={FINAL_HOUR}",
                    entry.hour
                )));
            }
            let hour = entry.hour;
            if map.insert(hour, entry).is_some() {
                return Err(HourglassError::invalid(format!("hour {hour} listed twice")));
            }
        }
        Ok(Self { entries: map })
    }

    /// The built-in table: Ra's night journey, one hour per map act.
    pub fn standard() -> Self {
        let rows: [(Hour, &str, f64, f64, f64, Option<RewardDescriptor>); 12] = [
            (1,  "Entry to the West", 0.00, 0.0, 0.00, None),
            (2,  "Waters of Nun",     0.00, 0.0, 0.05, None),
            (3,  "City of Rostau",    0.05, 0.0, 0.10,
                 Some(reward(RewardKind::CardPack, "rostau_pack", RewardRarity::Common, 1))),
            (4,  "Path of Awakening", 0.05, 1.0, 0.10, None),
            (5,  "Sokar's Cavern",   -0.10, 0.0, 0.25,
                 Some(reward(RewardKind::Cards, "sokar_shroud", RewardRarity::Rare, 1))),
            (6,  "Khepri's Boat",     0.10, 0.0, 0.15,
                 Some(reward(RewardKind::DeckSlot, "khepri_slot", RewardRarity::Uncommon, 1))),
            (7,  "Isis and Nephthys", 0.15, 1.0, 0.15, None),
            (8,  "Fiery Domain",      0.10, 0.0, 0.30, None),
            (9,  "Blessed Dead",      0.20, 1.0, 0.25,
                 Some(reward(RewardKind::ChamberUnlock, "hall_of_the_blessed", RewardRarity::Epic, 1))),
            (10, "Drowning Enemies",  0.20, 0.0, 0.35, None),
            (11, "Preparing Dawn",    0.25, 1.0, 0.35, None),
            (12, "Rebirth Portal",    0.30, 2.0, 0.50,
                 Some(reward(RewardKind::Title, "ra_reborn", RewardRarity::Legendary, 1))),
        ];

        let entries = rows
            .into_iter()
            .map(|(hour, name, accrual, draw, damage, reward)| {
                (hour, HourEntry {
                    hour,
                    name: name.to_string(),
                    modifiers: HourModifiers {
                        accrual_delta: accrual,
                        draw_delta:    draw,
                        damage_delta:  damage,
                    },
                    reward,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, hour: Hour) -> Option<&HourEntry> {
        self.entries.get(&hour)
    }

    pub fn modifiers(&self, hour: Hour) -> HourModifiers {
        self.entries.get(&hour).map(|e| e.modifiers).unwrap_or_default()
    }

    pub fn reward(&self, hour: Hour) -> Option<&RewardDescriptor> {
        self.entries.get(&hour).and_then(|e| e.reward.as_ref())
    }

    /// Every hour's rate must stay positive on top of `base`.
    pub fn check_base_rate(&self, base: AccrualRate) -> HourglassResult<()> {
        for hour in FIRST_HOUR..=FINAL_HOUR {
            base.offset_by(self.modifiers(hour).accrual_delta)?;
        }
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &HourEntry> {
        self.entries.values()
    }
}

impl Default for HourTable {
    fn default() -> Self { Self::standard() }
}

fn reward(kind: RewardKind, id: &str, rarity: RewardRarity, quantity: u32) -> RewardDescriptor {
    RewardDescriptor { kind, id: id.to_string(), rarity, quantity }
}

/// Result of entering a new hour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourAdvance {
    pub hour:         Hour,
    pub accrual_rate: AccrualRate,
    pub reward:       Option<RewardDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourProgression {
    current_hour: Hour,
    table:        HourTable,
}

impl HourProgression {
    /// A fresh campaign at hour 1.
    pub fn new(table: HourTable) -> Self {
        Self { current_hour: FIRST_HOUR, table }
    }

    pub fn at_hour(table: HourTable, hour: Hour) -> HourglassResult<Self> {
        if !(FIRST_HOUR..=FINAL_HOUR).contains(&hour) {
            return Err(HourglassError::invalid(format!(
                "hour must be {FIRST_HOUR}..={FINAL_HOUR}, got {hour}"
            )));
        }
        Ok(Self { current_hour: hour, table })
    }

    pub fn current_hour(&self) -> Hour { self.current_hour }
    pub fn table(&self) -> &HourTable { &self.table }

    pub fn is_complete(&self) -> bool {
        self.current_hour >= FINAL_HOUR
    }

    pub fn hour_name(&self) -> &str {
        self.table
            .entry(self.current_hour)
            .map(|e| e.name.as_str())
            .unwrap_or("Unnamed Hour")
    }

    pub fn get_modifier(&self, kind: ModifierKind) -> f64 {
        self.table.modifiers(self.current_hour).get(kind)
    }

    fn accrual_delta(&self, hour: Hour) -> f64 {
        self.table.modifiers(hour).accrual_delta
    }

    /// The hour-free rate behind `pool`'s current rate.
    pub fn base_rate(&self, pool: &ResourcePool) -> HourglassResult<AccrualRate> {
        pool.accrual_rate().offset_by(-self.accrual_delta(self.current_hour))
    }

    /// `base` plus the current hour's accrual delta.
    pub fn rate_for(&self, base: AccrualRate) -> HourglassResult<AccrualRate> {
        base.offset_by(self.accrual_delta(self.current_hour))
    }

    /// Start of a combat: put the current hour's rate over `base` on `pool`.
    pub fn apply_to(&self, pool: &mut ResourcePool, base: AccrualRate) -> HourglassResult<()> {
        pool.set_rate(self.rate_for(base)?);
        Ok(())
    }

    /// Move to the next hour and re-rate `pool`.
    ///
    /// The new rate is `pool rate - delta(old hour) + delta(new hour)`. At
    /// the final hour, or if that rate would not be positive, this fails
    /// and changes nothing.
    pub fn advance_hour(&mut self, pool: &mut ResourcePool) -> HourglassResult<HourAdvance> {
        if self.is_complete() {
            return Err(HourglassError::TerminalState { hour: self.current_hour });
        }
        let next = self.current_hour + 1;
        let rate = pool
            .accrual_rate()
            .rebase(self.accrual_delta(self.current_hour), self.accrual_delta(next))?;

        self.current_hour = next;
        pool.set_rate(rate);

        log::info!(
            "progression: entered hour {next} ({}) rate={rate}",
            self.hour_name()
        );
        if self.is_complete() {
            log::info!("progression: campaign complete");
        }

        Ok(HourAdvance {
            hour: next,
            accrual_rate: rate,
            reward: self.table.reward(next).cloned(),
        })
    }

    /// Extra cards per draw for the current hour, rounded down, never negative.
    pub fn draw_bonus(&self) -> u32 {
        self.get_modifier(ModifierKind::Draw).max(0.0).floor() as u32
    }
}
