//! Combat session tests.
//!
//! Tests cover: both sides ticking, the event log, blocking intervals
//! across both sides, hour advances mid-session, the command surface,
//! momentum/resonance, and the shared (mutex) combatant.

use hourglass_core::{
    combatant::{Alignment, Combatant, Resonance, SharedCombatant},
    command::{CommandOutcome, SessionCommand},
    config::HourglassConfig,
    error::HourglassError,
    event::HourglassEvent,
    progression::HourProgression,
    session::CombatSession,
    types::Side,
};
use std::thread;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (CombatSession, HourProgression) {
    init_logging();
    let config = HourglassConfig::default_test();
    let progression = HourProgression::new(config.hours.clone());
    let session = CombatSession::with_id("session-test".into(), &config, &progression).unwrap();
    (session, progression)
}

#[test]
fn both_sides_accrue_and_log_it() {
    let (mut session, _) = setup();
    let (player, enemy) = session.tick(2.5).unwrap();
    assert_eq!(player.produced, 2);
    assert_eq!(enemy.credited, 2);
    assert_eq!(session.player().current(), 5);
    assert_eq!(session.enemy().current(), 5);

    let events = session.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        HourglassEvent::GrainsAccrued { side: Side::Player, produced: 2, credited: 2, current: 5 }
    );
    assert!(session.events().is_empty(), "drain clears the log");
}

#[test]
fn overflow_is_reported_as_produced_but_not_credited() {
    let (mut session, _) = setup();
    let (player, _) = session.tick(5.0).unwrap();
    assert_eq!(player.produced, 5);
    assert_eq!(player.credited, 3);
    assert_eq!(session.player().current(), 6);
    assert_eq!(session.player().time_to_next_grain(), None);
}

#[test]
fn invalid_delta_touches_neither_side() {
    let (mut session, _) = setup();
    session.tick(0.5).unwrap();
    let player = session.player().clone();
    let enemy = session.enemy().clone();

    assert!(matches!(session.tick(-1.0), Err(HourglassError::InvalidArgument(_))));
    assert_eq!(session.player(), &player);
    assert_eq!(session.enemy(), &enemy);
}

#[test]
fn payments_are_logged_either_way() {
    let (mut session, _) = setup();
    assert!(!session.pay(Side::Player, 4).unwrap());
    assert!(session.pay(Side::Enemy, 3).unwrap());

    assert_eq!(
        session.events(),
        &[
            HourglassEvent::PaymentRefused { side: Side::Player, cost: 4, current: 3 },
            HourglassEvent::SandSpent { side: Side::Enemy, cost: 3, remaining: 0 },
        ]
    );
    assert!(session.pay(Side::Player, 7).is_err(), "cost above max");
}

#[test]
fn blocking_intervals_hold_both_sides() {
    let (mut session, _) = setup();
    session.begin_blocking_interval();
    session.begin_blocking_interval();
    let (p, e) = session.tick(5.0).unwrap();
    assert_eq!((p.produced, e.produced), (0, 0));

    assert_eq!(session.end_blocking_interval().unwrap(), 1);
    let (p, _) = session.tick(5.0).unwrap();
    assert_eq!(p.produced, 0);

    assert_eq!(session.end_blocking_interval().unwrap(), 0);
    let (p, e) = session.tick(1.0).unwrap();
    assert_eq!((p.produced, e.produced), (1, 1));

    let pauses = session
        .events()
        .iter()
        .filter(|e| matches!(e, HourglassEvent::AccrualPaused { .. }))
        .count();
    assert_eq!(pauses, 2, "one pause event per side, not per nesting level");

    let err = session.end_blocking_interval().unwrap_err();
    assert!(matches!(err, HourglassError::Logic(_)));
}

#[test]
fn hour_advance_re_rates_only_the_player() {
    let (mut session, mut progression) = setup();
    session.advance_hour(&mut progression).unwrap();
    session.advance_hour(&mut progression).unwrap();

    assert_eq!(session.player().pool().accrual_rate().micro(), 1_050_000);
    assert_eq!(session.enemy().pool().accrual_rate().micro(), 1_000_000);

    let last = session.events().last().unwrap();
    match last {
        HourglassEvent::HourAdvanced { hour, name, reward, .. } => {
            assert_eq!(*hour, 3);
            assert_eq!(name, "City of Rostau");
            assert!(reward.is_some());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn final_hour_logs_campaign_completion() {
    let (mut session, mut progression) = setup();
    for _ in 0..11 {
        session.advance_hour(&mut progression).unwrap();
    }
    assert_eq!(session.events().last(), Some(&HourglassEvent::CampaignCompleted));
    assert!(matches!(
        session.advance_hour(&mut progression),
        Err(HourglassError::TerminalState { hour: 12 })
    ));
}

#[test]
fn commands_arrive_as_tagged_json() {
    let (mut session, mut progression) = setup();
    let script = [
        r#"{"cmd":"tick","delta_seconds":1.0}"#,
        r#"{"cmd":"begin_blocking"}"#,
        r#"{"cmd":"tick","delta_seconds":3.0}"#,
        r#"{"cmd":"end_blocking"}"#,
        r#"{"cmd":"play_card","side":"player","cost":4}"#,
        r#"{"cmd":"advance_hour"}"#,
    ];

    let outcomes: Vec<CommandOutcome> = script
        .iter()
        .map(|line| {
            let command: SessionCommand = serde_json::from_str(line).unwrap();
            session.apply(command, &mut progression).unwrap()
        })
        .collect();

    assert!(matches!(outcomes[1], CommandOutcome::Blocking { depth: 1 }));
    assert!(matches!(outcomes[3], CommandOutcome::Blocking { depth: 0 }));
    assert_eq!(outcomes[4], CommandOutcome::Paid { side: Side::Player, paid: true });
    assert_eq!(session.player().current(), 0);
    assert_eq!(progression.current_hour(), 2);
}

#[test]
fn divine_judgment_and_regen_arrive_as_commands() {
    let (mut session, mut progression) = setup();
    let script = [
        r#"{"cmd":"judge","side":"player","alignment":"order"}"#,
        r#"{"cmd":"judge","side":"player","alignment":"balance"}"#,
        r#"{"cmd":"set_regen","side":"enemy","context":{"health_fraction":0.2}}"#,
    ];
    let outcomes: Vec<CommandOutcome> = script
        .iter()
        .map(|line| session.apply(serde_json::from_str(line).unwrap(), &mut progression).unwrap())
        .collect();

    assert_eq!(outcomes[0], CommandOutcome::Favor { side: Side::Player, favor: 1 });
    assert_eq!(outcomes[1], CommandOutcome::Favor { side: Side::Player, favor: 1 });
    assert_eq!(outcomes[2], CommandOutcome::RegenSet { side: Side::Enemy });
    assert_eq!(
        session.drain_events(),
        vec![HourglassEvent::DivineFavorChanged { side: Side::Player, favor: 1 }],
        "balance leaves favor alone and logs nothing"
    );

    session.begin_blocking_interval();
    session.end_blocking_interval().unwrap();
    session.set_regen_context(Side::Player, None).unwrap();
    let (player, enemy) = session.tick(2.0).unwrap();
    assert_eq!(player.produced, 2);
    assert_eq!(enemy.produced, 3, "desperate enemy regenerates at 1.5x");

    assert_eq!(session.apply_divine_judgment(Side::Enemy, Alignment::Chaos), -1);
}

#[test]
fn affordability_query_leaves_the_log_alone() {
    let (session, _) = setup();
    let view: &CombatSession = &session;
    assert!(view.can_afford(Side::Player, 3).unwrap());
    assert!(!view.can_afford(Side::Enemy, 4).unwrap());
    assert!(view.can_afford(Side::Player, 7).is_err());
    assert!(view.events().is_empty());
}

#[test]
fn cheapest_affordable_skips_unpayable_costs() {
    let (session, _) = setup();
    assert_eq!(session.cheapest_affordable(Side::Enemy, &[5, 3, 9, 4]), Some(3));
    assert_eq!(session.cheapest_affordable(Side::Enemy, &[5, 4]), None);
    assert_eq!(session.cheapest_affordable(Side::Enemy, &[]), None);
}

#[test]
fn momentum_builds_on_cheaper_plays() {
    let config = HourglassConfig::default_test();
    let mut c = Combatant::new(Side::Player, &config.player, config.clock).unwrap();
    c.pool_mut().set_current(6);

    assert!(c.play_card(3).unwrap());
    assert!(c.play_card(2).unwrap());
    assert!(c.play_card(1).unwrap());
    assert_eq!(c.momentum().stacks, 2);
    assert_eq!(c.momentum_reduction(), 2);

    assert!(!c.play_card(4).unwrap(), "unpaid plays leave momentum alone");
    assert_eq!(c.momentum().stacks, 2);

    c.pool_mut().set_current(6);
    assert!(c.play_card(5).unwrap());
    assert_eq!(c.momentum().stacks, 0, "a dearer card resets momentum");
}

#[test]
fn resonance_compares_cost_to_sand_on_hand() {
    let config = HourglassConfig::default_test();
    let c = Combatant::new(Side::Player, &config.player, config.clock).unwrap();
    assert_eq!(c.resonance(3), Resonance::Perfect);
    assert_eq!(c.resonance(2), Resonance::Minor);
    assert_eq!(c.resonance(4), Resonance::Minor);
    assert_eq!(c.resonance(6), Resonance::None);
}

#[test]
fn reset_for_combat_starts_clean() {
    let config = HourglassConfig::default_test();
    let mut c = Combatant::new(Side::Enemy, &config.enemy, config.clock).unwrap();
    c.tick(0.6).unwrap();
    c.begin_blocking_interval();
    c.play_card(1).unwrap();

    c.reset_for_combat(3);
    assert_eq!(c.current(), 3);
    assert!(!c.is_paused());
    assert_eq!(c.clock().elapsed_unaccounted(), 0.0);
    assert_eq!(c.momentum().stacks, 0);
}

#[test]
fn shared_combatant_never_overspends_under_contention() {
    let config = HourglassConfig::default_test();
    let shared = SharedCombatant::new(
        Combatant::new(Side::Player, &config.player, config.clock).unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || shared.pay(1).unwrap())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|paid| *paid)
        .count();

    assert_eq!(successes, 3, "only the three grains on hand can be spent");
    assert_eq!(shared.current(), 0);
}
