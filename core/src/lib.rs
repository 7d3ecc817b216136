//! Hour-Glass Initiative — the sand economy behind card combat.
//!
//! Layering, leaf first:
//!   clock → pool → gate → pacer → combatant → session
//!   progression (campaign hours) re-rates a pool; snapshot saves both.

pub mod clock;
pub mod combatant;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod pacer;
pub mod pool;
pub mod progression;
pub mod rate;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod types;
