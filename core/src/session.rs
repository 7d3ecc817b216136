//! Combat session — the per-combat owner of both hourglasses.
//!
//! RULES:
//!   - One session per combat. Nothing here is global.
//!   - Player and enemy tick in that order, every frame.
//!   - Blocking intervals (animations) hold both sides still.
//!   - Arguments are validated before either side is touched.
//!   - Every state change is recorded in the event log.

use crate::{
    clock::seconds_to_nanos,
    combatant::{Accrual, Alignment, Combatant, RegenContext},
    command::{CommandOutcome, SessionCommand},
    config::HourglassConfig,
    error::{HourglassError, HourglassResult},
    event::HourglassEvent,
    gate::affordable,
    progression::{HourAdvance, HourProgression},
    types::{Grains, SessionId, Side},
};

pub struct CombatSession {
    pub session_id: SessionId,
    player:         Combatant,
    enemy:          Combatant,
    events:         Vec<HourglassEvent>,
}

impl CombatSession {
    /// Start a combat. The player's pool runs at the campaign's current rate.
    pub fn new(config: &HourglassConfig, progression: &HourProgression) -> HourglassResult<Self> {
        Self::with_id(uuid::Uuid::new_v4().to_string(), config, progression)
    }

    pub fn with_id(
        session_id: SessionId,
        config: &HourglassConfig,
        progression: &HourProgression,
    ) -> HourglassResult<Self> {
        let mut player = Combatant::new(Side::Player, &config.player, config.clock)?;
        progression.apply_to(player.pool_mut(), config.player.accrual_rate)?;
        let enemy = Combatant::new(Side::Enemy, &config.enemy, config.clock)?;

        log::info!(
            "session {session_id}: combat started in hour {} ({}), player rate={}",
            progression.current_hour(),
            progression.hour_name(),
            player.pool().accrual_rate()
        );

        Ok(Self { session_id, player, enemy, events: Vec::new() })
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Enemy  => &self.enemy,
        }
    }

    fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy  => &mut self.enemy,
        }
    }

    pub fn player(&self) -> &Combatant { &self.player }
    pub fn enemy(&self) -> &Combatant { &self.enemy }

    /// One frame for both sides.
    pub fn tick(&mut self, delta_seconds: f64) -> HourglassResult<(Accrual, Accrual)> {
        seconds_to_nanos(delta_seconds)?;

        let player = self.player.tick(delta_seconds)?;
        self.record_accrual(Side::Player, player);
        let enemy = self.enemy.tick(delta_seconds)?;
        self.record_accrual(Side::Enemy, enemy);
        Ok((player, enemy))
    }

    fn record_accrual(&mut self, side: Side, accrual: Accrual) {
        if accrual.produced == 0 {
            return;
        }
        let current = self.combatant(side).current();
        self.events.push(HourglassEvent::GrainsAccrued {
            side,
            produced: accrual.produced,
            credited: accrual.credited,
            current,
        });
    }

    pub fn can_afford(&self, side: Side, cost: Grains) -> HourglassResult<bool> {
        self.combatant(side).can_afford(cost)
    }

    pub fn pay(&mut self, side: Side, cost: Grains) -> HourglassResult<bool> {
        let paid = self.combatant_mut(side).pay(cost)?;
        self.record_payment(side, cost, paid);
        Ok(paid)
    }

    /// Like `pay`, but also feeds the side's momentum tracker.
    pub fn play_card(&mut self, side: Side, cost: Grains) -> HourglassResult<bool> {
        let paid = self.combatant_mut(side).play_card(cost)?;
        self.record_payment(side, cost, paid);
        Ok(paid)
    }

    fn record_payment(&mut self, side: Side, cost: Grains, paid: bool) {
        let current = self.combatant(side).current();
        self.events.push(if paid {
            HourglassEvent::SandSpent { side, cost, remaining: current }
        } else {
            HourglassEvent::PaymentRefused { side, cost, current }
        });
    }

    /// Cheapest cost in `hand` this side can pay right now.
    pub fn cheapest_affordable(&self, side: Side, hand: &[Grains]) -> Option<Grains> {
        let pool = self.combatant(side).pool();
        hand.iter()
            .copied()
            .filter(|&cost| affordable(pool, cost).unwrap_or(false))
            .min()
    }

    /// Judge an action by one side. Logged only when favor actually moves.
    pub fn apply_divine_judgment(&mut self, side: Side, alignment: Alignment) -> i32 {
        let before = self.combatant(side).divine_favor();
        let favor = self.combatant_mut(side).apply_divine_judgment(alignment);
        if favor != before {
            self.events.push(HourglassEvent::DivineFavorChanged { side, favor });
        }
        favor
    }

    pub fn set_regen_context(
        &mut self,
        side: Side,
        context: Option<RegenContext>,
    ) -> HourglassResult<()> {
        self.combatant_mut(side).set_regen_context(context)
    }

    pub fn begin_blocking_interval(&mut self) -> u32 {
        let depth = self.player.begin_blocking_interval();
        self.enemy.begin_blocking_interval();
        if depth == 1 {
            self.events.push(HourglassEvent::AccrualPaused { side: Side::Player });
            self.events.push(HourglassEvent::AccrualPaused { side: Side::Enemy });
        }
        depth
    }

    pub fn end_blocking_interval(&mut self) -> HourglassResult<u32> {
        if self.player.pacer().depth() == 0 || self.enemy.pacer().depth() == 0 {
            return Err(HourglassError::Logic(
                "end_blocking_interval without a matching begin".into(),
            ));
        }
        let depth = self.player.end_blocking_interval()?;
        self.enemy.end_blocking_interval()?;
        if depth == 0 {
            self.events.push(HourglassEvent::AccrualResumed { side: Side::Player });
            self.events.push(HourglassEvent::AccrualResumed { side: Side::Enemy });
        }
        Ok(depth)
    }

    pub fn blocking_depth(&self) -> u32 {
        self.player.pacer().depth()
    }

    /// Advance the campaign hour and re-rate the player's pool.
    pub fn advance_hour(&mut self, progression: &mut HourProgression) -> HourglassResult<HourAdvance> {
        let advance = progression.advance_hour(self.player.pool_mut())?;
        self.events.push(HourglassEvent::HourAdvanced {
            hour:         advance.hour,
            name:         progression.hour_name().to_string(),
            accrual_rate: advance.accrual_rate.grains_per_sec(),
            reward:       advance.reward.clone(),
        });
        if progression.is_complete() {
            self.events.push(HourglassEvent::CampaignCompleted);
        }
        Ok(advance)
    }

    pub fn apply(
        &mut self,
        command: SessionCommand,
        progression: &mut HourProgression,
    ) -> HourglassResult<CommandOutcome> {
        Ok(match command {
            SessionCommand::Tick { delta_seconds } => {
                let (player, enemy) = self.tick(delta_seconds)?;
                CommandOutcome::Ticked { player, enemy }
            }
            SessionCommand::Pay { side, cost } => CommandOutcome::Paid {
                side,
                paid: self.pay(side, cost)?,
            },
            SessionCommand::PlayCard { side, cost } => CommandOutcome::Paid {
                side,
                paid: self.play_card(side, cost)?,
            },
            SessionCommand::BeginBlocking => CommandOutcome::Blocking {
                depth: self.begin_blocking_interval(),
            },
            SessionCommand::EndBlocking => CommandOutcome::Blocking {
                depth: self.end_blocking_interval()?,
            },
            SessionCommand::AdvanceHour => CommandOutcome::HourAdvanced {
                advance: self.advance_hour(progression)?,
            },
            SessionCommand::Judge { side, alignment } => CommandOutcome::Favor {
                side,
                favor: self.apply_divine_judgment(side, alignment),
            },
            SessionCommand::SetRegen { side, context } => {
                self.set_regen_context(side, context)?;
                CommandOutcome::RegenSet { side }
            }
        })
    }

    pub fn events(&self) -> &[HourglassEvent] {
        &self.events
    }

    /// Hand the accumulated events to the caller and clear the log.
    pub fn drain_events(&mut self) -> Vec<HourglassEvent> {
        std::mem::take(&mut self.events)
    }
}
