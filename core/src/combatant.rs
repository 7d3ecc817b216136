//! One side of a combat: a sand pool plus the paced clock that feeds it.
//!
//! Player and enemy each own a Combatant and share nothing mutable, so
//! there is never any cross-combatant locking.
//!
//! Dynamic regeneration is opt-in: the caller feeds in health and blessing,
//! and the combatant bends its pool rate by those plus its divine favor.
//! All factors are exact integer ratios, so replays stay bit-identical.

use crate::{
    clock::{ClockSettings, HourglassClock},
    config::CombatantConfig,
    error::{HourglassError, HourglassResult},
    gate::{affordable, PlayabilityGate},
    pacer::{PacerState, TurnPacer},
    pool::ResourcePool,
    rate::AccrualRate,
    types::{Grains, Side},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

pub const MAX_MOMENTUM_STACKS: u32 = 5;
pub const MAX_MOMENTUM_REDUCTION: u32 = 3;
pub const MAX_DIVINE_FAVOR: i32 = 10;

/// Grains produced by one tick and how many of them the pool kept.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Accrual {
    pub produced: Grains,
    pub credited: Grains,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resonance {
    /// Card cost equals the sand on hand.
    Perfect,
    /// Off by one.
    Minor,
    None,
}

/// Momentum builds while each card played is cheaper than the last.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Momentum {
    pub stacks:    u32,
    pub last_cost: Grains,
}

impl Momentum {
    pub fn record(&mut self, cost: Grains) {
        if cost < self.last_cost {
            self.stacks = (self.stacks + 1).min(MAX_MOMENTUM_STACKS);
        } else {
            self.stacks = 0;
        }
        self.last_cost = cost;
    }

    pub fn reduction(&self) -> Grains {
        self.stacks.min(MAX_MOMENTUM_REDUCTION)
    }
}

/// Moral weight of an action, judged by the gods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Order,
    Chaos,
    Balance,
}

/// Battle state that bends the regeneration rate. Supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegenContext {
    /// Current health over max health, 0.0..=1.0.
    pub health_fraction: f64,
    #[serde(default)]
    pub divine_blessing: bool,
}

impl Default for RegenContext {
    fn default() -> Self {
        Self { health_fraction: 1.0, divine_blessing: false }
    }
}

/// Rate factors as (numerator, denominator), applied in this order.
const DESPERATE:      (u128, u128) = (3, 2);   // health < 30%
const WOUNDED:        (u128, u128) = (6, 5);   // health < 60%
const NEARLY_FULL:    (u128, u128) = (1, 2);   // sand >= max - 1
const BLESSED:        (u128, u128) = (5, 4);
const FAVORED:        (u128, u128) = (13, 10); // favor > 5
const DISFAVORED:     (u128, u128) = (7, 10);  // favor < -5

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Combatant {
    side:         Side,
    pool:         ResourcePool,
    pacer:        TurnPacer,
    momentum:     Momentum,
    divine_favor: i32,
    regen:        Option<RegenContext>,
}

impl Combatant {
    pub fn new(side: Side, config: &CombatantConfig, clock: ClockSettings) -> HourglassResult<Self> {
        let pool = ResourcePool::new(config.max_sand, config.initial_sand, config.accrual_rate)?;
        Ok(Self::from_parts(side, pool, HourglassClock::with_settings(clock)?))
    }

    pub fn from_parts(side: Side, pool: ResourcePool, clock: HourglassClock) -> Self {
        Self {
            side,
            pool,
            pacer: TurnPacer::new(clock),
            momentum: Momentum::default(),
            divine_favor: 0,
            regen: None,
        }
    }

    pub fn side(&self) -> Side { self.side }
    pub fn pool(&self) -> &ResourcePool { &self.pool }
    pub fn pool_mut(&mut self) -> &mut ResourcePool { &mut self.pool }
    pub fn clock(&self) -> &HourglassClock { self.pacer.clock() }
    pub fn pacer(&self) -> &TurnPacer { &self.pacer }
    pub fn momentum(&self) -> Momentum { self.momentum }

    pub fn current(&self) -> Grains { self.pool.current() }
    pub fn max(&self) -> Grains { self.pool.max() }

    pub fn divine_favor(&self) -> i32 { self.divine_favor }
    pub fn regen_context(&self) -> Option<RegenContext> { self.regen }

    /// Shift divine favor by one step toward order or chaos. Returns the new favor.
    pub fn apply_divine_judgment(&mut self, alignment: Alignment) -> i32 {
        self.divine_favor = match alignment {
            Alignment::Order   => (self.divine_favor + 1).min(MAX_DIVINE_FAVOR),
            Alignment::Chaos   => (self.divine_favor - 1).max(-MAX_DIVINE_FAVOR),
            Alignment::Balance => self.divine_favor,
        };
        log::debug!("{}: divine favor {}", self.side.name(), self.divine_favor);
        self.divine_favor
    }

    /// Turn dynamic regeneration on (`Some`) or off (`None`).
    /// Health is clamped to 0..=1; NaN is rejected.
    pub fn set_regen_context(&mut self, context: Option<RegenContext>) -> HourglassResult<()> {
        self.regen = match context {
            Some(ctx) if ctx.health_fraction.is_nan() => {
                return Err(HourglassError::invalid("health_fraction must be a number, got NaN"));
            }
            Some(ctx) => Some(RegenContext {
                health_fraction: ctx.health_fraction.clamp(0.0, 1.0),
                ..ctx
            }),
            None => None,
        };
        Ok(())
    }

    /// The rate `tick` accrues at: the pool rate, bent by the regeneration
    /// context when one is set. Never below one micro-grain per second.
    pub fn effective_rate(&self) -> AccrualRate {
        let base = self.pool.accrual_rate();
        let Some(ctx) = self.regen else {
            return base;
        };

        let health = if ctx.health_fraction < 0.3 {
            Some(DESPERATE)
        } else if ctx.health_fraction < 0.6 {
            Some(WOUNDED)
        } else {
            None
        };
        let nearly_full = (self.pool.current() + 1 >= self.pool.max()).then_some(NEARLY_FULL);
        let blessing = ctx.divine_blessing.then_some(BLESSED);
        let favor = match self.divine_favor {
            f if f > 5  => Some(FAVORED),
            f if f < -5 => Some(DISFAVORED),
            _ => None,
        };

        let micro = [health, nearly_full, blessing, favor]
            .into_iter()
            .flatten()
            .fold(base.micro() as u128, |m, (num, den)| m * num / den)
            .clamp(1, u64::MAX as u128) as u64;
        AccrualRate::from_micro(micro).unwrap_or(base)
    }

    /// Advance the clock by one frame and bank what it produced.
    pub fn tick(&mut self, delta_seconds: f64) -> HourglassResult<Accrual> {
        let produced = self.pacer.advance(delta_seconds, self.effective_rate())?;
        let credited = self.pool.credit(produced);
        if produced > 0 {
            log::debug!(
                "{}: +{credited} sand ({produced} produced), now {}/{}",
                self.side.name(),
                self.pool.current(),
                self.pool.max()
            );
        }
        Ok(Accrual { produced, credited })
    }

    pub fn gate(&mut self) -> PlayabilityGate<'_> {
        PlayabilityGate::new(&mut self.pool)
    }

    pub fn can_afford(&self, cost: Grains) -> HourglassResult<bool> {
        affordable(&self.pool, cost)
    }

    pub fn pay(&mut self, cost: Grains) -> HourglassResult<bool> {
        let paid = self.gate().pay(cost)?;
        if paid {
            log::debug!("{}: spent {cost} sand, {} left", self.side.name(), self.pool.current());
        }
        Ok(paid)
    }

    /// Pay for a card and, on success, feed its cost to the momentum tracker.
    pub fn play_card(&mut self, cost: Grains) -> HourglassResult<bool> {
        let paid = self.pay(cost)?;
        if paid {
            self.momentum.record(cost);
        }
        Ok(paid)
    }

    pub fn momentum_reduction(&self) -> Grains {
        self.momentum.reduction()
    }

    pub fn resonance(&self, cost: Grains) -> Resonance {
        match cost.abs_diff(self.pool.current()) {
            0 => Resonance::Perfect,
            1 => Resonance::Minor,
            _ => Resonance::None,
        }
    }

    pub fn begin_blocking_interval(&mut self) -> u32 {
        let depth = self.pacer.begin_blocking_interval();
        if depth == 1 {
            log::debug!("{}: accrual paused", self.side.name());
        }
        depth
    }

    pub fn end_blocking_interval(&mut self) -> HourglassResult<u32> {
        let depth = self.pacer.end_blocking_interval()?;
        if depth == 0 {
            log::debug!("{}: accrual resumed", self.side.name());
        }
        Ok(depth)
    }

    pub fn is_paused(&self) -> bool {
        self.pacer.state() == PacerState::Paused
    }

    /// Seconds until the next grain lands, `None` when the pool is full.
    pub fn time_to_next_grain(&self) -> Option<f64> {
        if self.pool.is_full() {
            return None;
        }
        Some(self.pacer.clock().time_to_next_grain(self.effective_rate()))
    }

    /// Start-of-combat reset: clock remainder cleared, intervals closed,
    /// momentum and favor dropped, sand set to `initial`. The regeneration
    /// context is the caller's and is kept.
    pub fn reset_for_combat(&mut self, initial: Grains) {
        self.pacer.reset();
        self.momentum = Momentum::default();
        self.divine_favor = 0;
        self.pool.set_current(initial);
    }
}

/// A combatant behind one mutex, for hosts that simulate and render on
/// different threads. Every operation runs inside a single lock, so `pay`
/// stays one critical section.
#[derive(Debug, Clone)]
pub struct SharedCombatant {
    inner: Arc<Mutex<Combatant>>,
}

impl SharedCombatant {
    pub fn new(combatant: Combatant) -> Self {
        Self { inner: Arc::new(Mutex::new(combatant)) }
    }

    /// Run `f` with exclusive access.
    ///
    /// Operations never leave a combatant half-updated, so a poisoned lock
    /// still guards consistent state and is recovered rather than surfaced.
    pub fn with<R>(&self, f: impl FnOnce(&mut Combatant) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn tick(&self, delta_seconds: f64) -> HourglassResult<Accrual> {
        self.with(|c| c.tick(delta_seconds))
    }

    pub fn pay(&self, cost: Grains) -> HourglassResult<bool> {
        self.with(|c| c.pay(cost))
    }

    pub fn current(&self) -> Grains {
        self.with(|c| c.current())
    }
}
