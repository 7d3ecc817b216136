//! Playability gate — may this card be paid for right now?
//!
//! The gate holds the pool by exclusive borrow for its whole lifetime, so
//! the check and the debit inside `pay` can never be split by another
//! writer.

use crate::{
    error::{HourglassError, HourglassResult},
    pool::ResourcePool,
    types::Grains,
};

pub struct PlayabilityGate<'a> {
    pool: &'a mut ResourcePool,
}

impl<'a> PlayabilityGate<'a> {
    pub fn new(pool: &'a mut ResourcePool) -> Self {
        Self { pool }
    }

    /// A cost above the pool's max can never be paid: that is a card
    /// configuration error, reported as `InvalidArgument`.
    pub fn can_afford(&self, cost: Grains) -> HourglassResult<bool> {
        affordable(self.pool, cost)
    }

    pub fn pay(&mut self, cost: Grains) -> HourglassResult<bool> {
        if !self.can_afford(cost)? {
            return Ok(false);
        }
        Ok(self.pool.debit(cost))
    }

    pub fn pool(&self) -> &ResourcePool {
        self.pool
    }
}

/// Read-only affordability check, for callers holding a shared borrow.
pub fn affordable(pool: &ResourcePool, cost: Grains) -> HourglassResult<bool> {
    validate_cost(pool, cost)?;
    Ok(pool.current() >= cost)
}

pub fn validate_cost(pool: &ResourcePool, cost: Grains) -> HourglassResult<()> {
    if cost > pool.max() {
        return Err(HourglassError::invalid(format!(
            "card cost {cost} exceeds max sand {}",
            pool.max()
        )));
    }
    Ok(())
}
