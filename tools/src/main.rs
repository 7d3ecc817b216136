//! sand-runner: headless driver for the Hour-Glass Initiative.
//!
//! Usage:
//!   sand-runner --seed 12345 --seconds 60 --fps 60 --data-dir ./data
//!   sand-runner --ipc-mode --hour 3

use anyhow::Result;
use hourglass_core::{
    command::SessionCommand,
    config::HourglassConfig,
    event::HourglassEvent,
    progression::HourProgression,
    rng::{FrameRng, Stream},
    session::CombatSession,
    types::{Grains, Hour, Side},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Enemy hand for batch runs; costs redrawn each time a card is played.
const ENEMY_HAND_SIZE: usize = 4;
/// Animation length after every enemy card, in seconds.
const CARD_ANIMATION_SECS: f64 = 0.6;

#[derive(serde::Serialize)]
struct UiState {
    session_id:    String,
    hour:          Hour,
    hour_name:     String,
    complete:      bool,
    player_sand:   Grains,
    player_max:    Grains,
    player_rate:   f64,
    player_favor:  i32,
    enemy_sand:    Grains,
    enemy_max:     Grains,
    blocking:      u32,
    next_grain_in: Option<f64>,
    events:        Vec<HourglassEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let seconds = parse_arg(&args, "--seconds", 60.0f64);
    let fps = parse_arg(&args, "--fps", 60.0f64);
    let start_hour = parse_arg(&args, "--hour", 1 as Hour);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = if Path::new(data_dir).join("hourglass.json").exists() {
        HourglassConfig::load(data_dir)?
    } else {
        log::warn!("no config in {data_dir}, using built-in defaults");
        HourglassConfig::default_test()
    };

    let mut progression = HourProgression::at_hour(config.hours.clone(), start_hour)?;
    let mut session = CombatSession::new(&config, &progression)?;

    if ipc_mode {
        run_ipc_loop(&mut session, &mut progression)?;
    } else {
        println!("Sands of Duat — sand-runner");
        println!("  seed:      {seed}");
        println!("  seconds:   {seconds}");
        println!("  fps:       {fps}");
        println!("  hour:      {start_hour}");
        println!("  data_dir:  {data_dir}");
        println!();
        let plays = run_batch(&mut session, seed, seconds, fps)?;
        print_summary(&session, &progression, plays, seconds);
    }

    Ok(())
}

/// Scripted combat: jittered frames; the enemy plays its cheapest
/// affordable card whenever it can, and each play blocks for an animation.
fn run_batch(session: &mut CombatSession, seed: u64, seconds: f64, fps: f64) -> Result<u64> {
    if !(fps > 0.0) {
        anyhow::bail!("--fps must be positive, got {fps}");
    }
    let mut frames = FrameRng::new(seed, Stream::FrameTiming);
    let mut deck = FrameRng::new(seed, Stream::EnemyHand);
    let max_cost = session.enemy().max() as u64;
    let mut hand: Vec<Grains> = (0..ENEMY_HAND_SIZE)
        .map(|_| deck.next_u64_below(max_cost + 1) as Grains)
        .collect();

    let mut elapsed = 0.0;
    let mut animation_left = 0.0;
    let mut plays = 0u64;

    while elapsed < seconds {
        let delta = frames.frame_delta(fps, 0.25);
        elapsed += delta;
        session.tick(delta)?;

        if animation_left > 0.0 {
            animation_left -= delta;
            if animation_left <= 0.0 {
                session.end_blocking_interval()?;
            }
            continue;
        }

        if let Some(cost) = session.cheapest_affordable(Side::Enemy, &hand) {
            if session.play_card(Side::Enemy, cost)? {
                plays += 1;
                if let Some(slot) = hand.iter().position(|&c| c == cost) {
                    hand[slot] = deck.next_u64_below(max_cost + 1) as Grains;
                }
                session.begin_blocking_interval();
                animation_left = CARD_ANIMATION_SECS;
            }
        }
    }

    if session.blocking_depth() > 0 {
        session.end_blocking_interval()?;
    }
    Ok(plays)
}

fn run_ipc_loop(session: &mut CombatSession, progression: &mut HourProgression) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }
        if buffer.trim() == "quit" {
            break;
        }

        let command: SessionCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        // Hourglass errors are caller mistakes: report them and keep going.
        match session.apply(command, progression) {
            Ok(_) => {
                let state = build_ui_state(session, progression);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            Err(e) => {
                log::warn!("command rejected: {e}");
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(session: &mut CombatSession, progression: &HourProgression) -> UiState {
    let events = session.drain_events();
    let player = session.player();
    let enemy = session.enemy();
    UiState {
        session_id:    session.session_id.clone(),
        hour:          progression.current_hour(),
        hour_name:     progression.hour_name().to_string(),
        complete:      progression.is_complete(),
        player_sand:   player.current(),
        player_max:    player.max(),
        player_rate:   player.effective_rate().grains_per_sec(),
        player_favor:  player.divine_favor(),
        enemy_sand:    enemy.current(),
        enemy_max:     enemy.max(),
        blocking:      session.blocking_depth(),
        next_grain_in: player.time_to_next_grain(),
        events,
    }
}

fn print_summary(session: &CombatSession, progression: &HourProgression, plays: u64, seconds: f64) {
    let accrued: u64 = session
        .events()
        .iter()
        .filter_map(|e| match e {
            HourglassEvent::GrainsAccrued { side: Side::Enemy, produced, .. } => Some(*produced as u64),
            _ => None,
        })
        .sum();
    let spent: u64 = session
        .events()
        .iter()
        .filter_map(|e| match e {
            HourglassEvent::SandSpent { side: Side::Enemy, cost, .. } => Some(*cost as u64),
            _ => None,
        })
        .sum();

    println!("=== RUN SUMMARY ===");
    println!("  session:        {}", session.session_id);
    println!("  hour:           {} ({})", progression.current_hour(), progression.hour_name());
    println!("  simulated:      {seconds:.1}s");
    println!("  events:         {}", session.events().len());
    println!("  enemy plays:    {plays}");
    println!("  enemy produced: {accrued}");
    println!("  enemy spent:    {spent}");
    println!(
        "  final sand:     player {}/{}  enemy {}/{}",
        session.player().current(),
        session.player().max(),
        session.enemy().current(),
        session.enemy().max()
    );
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
