//! Turn pacer tests.
//!
//! Tests cover: nested blocking intervals, unbalanced ends, and that
//! accrual inside a blocking window is fully suppressed.

use hourglass_core::{
    clock::HourglassClock,
    error::HourglassError,
    pacer::{PacerState, TurnPacer},
    rate::AccrualRate,
};

const RATE: AccrualRate = AccrualRate::ONE_PER_SECOND;

#[test]
fn nested_intervals_resume_only_on_the_last_end() {
    let mut pacer = TurnPacer::new(HourglassClock::new());

    assert_eq!(pacer.begin_blocking_interval(), 1);
    assert_eq!(pacer.begin_blocking_interval(), 2);
    assert_eq!(pacer.advance(5.0, RATE).unwrap(), 0);

    assert_eq!(pacer.end_blocking_interval().unwrap(), 1);
    assert_eq!(pacer.state(), PacerState::Paused);
    assert_eq!(pacer.advance(5.0, RATE).unwrap(), 0);

    assert_eq!(pacer.end_blocking_interval().unwrap(), 0);
    assert_eq!(pacer.state(), PacerState::Running);
    assert_eq!(pacer.advance(1.0, RATE).unwrap(), 1);
}

#[test]
fn unbalanced_end_is_a_logic_error() {
    let mut pacer = TurnPacer::new(HourglassClock::new());
    let err = pacer.end_blocking_interval().unwrap_err();
    assert!(matches!(err, HourglassError::Logic(_)), "got {err:?}");

    pacer.begin_blocking_interval();
    pacer.end_blocking_interval().unwrap();
    assert!(matches!(pacer.end_blocking_interval(), Err(HourglassError::Logic(_))));
    assert_eq!(pacer.depth(), 0);
    assert!(!pacer.clock().is_paused());
}

#[test]
fn balanced_window_behaves_as_if_never_paused_outside_it() {
    for n in 1..=5u32 {
        let mut blocked = TurnPacer::new(HourglassClock::new());
        let mut reference = TurnPacer::new(HourglassClock::new());

        blocked.advance(0.3, RATE).unwrap();
        reference.advance(0.3, RATE).unwrap();

        for _ in 0..n {
            blocked.begin_blocking_interval();
        }
        assert_eq!(blocked.advance(2.0, RATE).unwrap(), 0);
        for _ in 0..n {
            blocked.end_blocking_interval().unwrap();
        }
        assert_eq!(blocked.state(), PacerState::Running);

        for _ in 0..10 {
            assert_eq!(
                blocked.advance(0.35, RATE).unwrap(),
                reference.advance(0.35, RATE).unwrap(),
                "n={n}"
            );
        }
        assert_eq!(blocked.clock(), reference.clock());
    }
}

#[test]
fn reset_closes_open_intervals() {
    let mut pacer = TurnPacer::new(HourglassClock::new());
    pacer.begin_blocking_interval();
    pacer.begin_blocking_interval();

    pacer.reset();
    assert_eq!(pacer.depth(), 0);
    assert_eq!(pacer.state(), PacerState::Running);
    assert_eq!(pacer.advance(1.0, RATE).unwrap(), 1);
}
