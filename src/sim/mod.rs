//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - One step per frame, no wall-clock time
//! - Seeded RNG only
//! - Pipes processed oldest first
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{bird_coin_pickup, bird_pipe_collision, circles_touch, spans_overlap};
pub use state::{Bird, Coin, GameState, Pipe, RunPhase, RunTracker};
pub use tick::{TickInput, end, jump, spawn_coin, spawn_pipe, start, tick};
