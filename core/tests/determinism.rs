//! Two sessions, same seed, same script.
//! They must produce byte-identical event logs.

use hourglass_core::{
    config::HourglassConfig,
    progression::HourProgression,
    rng::{FrameRng, Stream},
    session::CombatSession,
    types::Side,
};

const HAND: [u32; 4] = [1, 2, 3, 5];

fn run(seed: u64, frames: usize) -> Vec<String> {
    let config = HourglassConfig::default_test();
    let mut progression = HourProgression::new(config.hours.clone());
    let mut session =
        CombatSession::with_id(format!("det-{seed}"), &config, &progression).unwrap();
    let mut timing = FrameRng::new(seed, Stream::FrameTiming);
    let mut hand = FrameRng::new(seed, Stream::EnemyHand);

    for frame in 0..frames {
        session.tick(timing.frame_delta(60.0, 0.4)).unwrap();

        if hand.chance(0.05) {
            let cost = HAND[hand.next_u64_below(HAND.len() as u64) as usize];
            session.play_card(Side::Enemy, cost).unwrap();
        }
        if frame % 240 == 0 {
            session.begin_blocking_interval();
        }
        if frame % 240 == 30 {
            session.end_blocking_interval().unwrap();
        }
        if frame % 1_000 == 999 && !progression.is_complete() {
            session.advance_hour(&mut progression).unwrap();
        }
    }

    session
        .drain_events()
        .iter()
        .map(|e| serde_json::to_string(e).expect("serialize event"))
        .collect()
}

#[test]
fn same_seed_produces_identical_event_logs() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let log_a = run(SEED, 6_000);
    let log_b = run(SEED, 6_000);

    assert!(!log_a.is_empty());
    assert_eq!(log_a.len(), log_b.len(), "Event log lengths differ");
    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(a, b, "Event log diverged at entry {i}");
    }
}

#[test]
fn different_seeds_produce_different_logs() {
    let log_a = run(42, 3_000);
    let log_b = run(99, 3_000);
    assert_ne!(log_a, log_b, "seed is not being used");
}
