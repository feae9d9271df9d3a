//! Flappy Daily - A browser Flappy-style arcade game
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (bird physics, pipes, coins, collisions)
//! - `difficulty`: Preset selection and the adaptive speed/gap ratchet
//! - `challenges`: Daily challenge generation, progress, streaks and rewards
//! - `persistence`: Key-value storage abstraction (LocalStorage on web)
//! - `platform`: Browser/native platform abstraction (calendar clock)
//! - `game`: Orchestrator wiring the above for the presentation layer

pub mod challenges;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod profile;
pub mod sim;
pub mod skins;
pub mod theme;

pub use challenges::{ChallengeKind, ChallengeManager, ChallengeTier, DailyChallenge};
pub use difficulty::{DifficultyController, DifficultyPreset};
pub use error::StorageError;
pub use game::{FrameSnapshot, Game};
pub use persistence::{KeyValueStore, MemoryStore};
pub use platform::{Clock, FixedClock, SystemClock};
pub use profile::Profile;
pub use skins::{Skin, SkinUnlocks, UnlockSnapshot};
pub use theme::Theme;

/// Game configuration constants
pub mod consts {
    /// Simulation rate: one `tick` per display frame
    pub const FRAME_RATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / FRAME_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield dimensions (the floor sits at the bottom edge)
    pub const PLAYFIELD_WIDTH: f32 = 400.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Bird defaults
    pub const BIRD_X: f32 = 80.0;
    pub const BIRD_START_Y: f32 = PLAYFIELD_HEIGHT / 2.0;
    pub const BIRD_WIDTH: f32 = 34.0;
    pub const BIRD_HEIGHT: f32 = 24.0;
    /// Downward acceleration (pixels/frame²)
    pub const GRAVITY: f32 = 0.5;
    /// Velocity set by a jump (negative = up)
    pub const JUMP_IMPULSE: f32 = -9.0;

    /// Pipe defaults
    pub const PIPE_WIDTH: f32 = 60.0;
    pub const PIPE_SPAWN_INTERVAL: u64 = 90; // 1.5 seconds at 60fps
    /// Minimum height of both the top and the bottom segment
    pub const PIPE_MIN_SEGMENT: f32 = 50.0;

    /// Coin defaults
    pub const COIN_RADIUS: f32 = 10.0;
    /// Pickup radius around the bird centre
    pub const BIRD_PICKUP_RADIUS: f32 = 12.0;
    pub const COIN_SPAWN_INTERVAL: u64 = 120;
    /// Frame offset so coins land between pipes rather than inside them
    pub const COIN_SPAWN_PHASE: u64 = 45;
    pub const COIN_SPAWN_OFFSET: f32 = 30.0;
    /// Vertical margin kept clear of coins at the top and bottom
    pub const COIN_MARGIN: f32 = 80.0;
}
