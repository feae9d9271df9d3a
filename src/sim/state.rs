//! Game state and core simulation types

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the first input
    Idle,
    /// Active gameplay
    Running,
    /// Run ended (crash or floor)
    Ended,
}

/// The player's bird. `pos` is the top-left corner; x never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    pub pos: Vec2,
    /// Vertical velocity (pixels/frame, positive = down)
    pub vel: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Bird {
    fn default() -> Self {
        Self {
            pos: Vec2::new(BIRD_X, BIRD_START_Y),
            vel: 0.0,
            width: BIRD_WIDTH,
            height: BIRD_HEIGHT,
        }
    }
}

impl Bird {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width, self.height) / 2.0
    }

    /// Lowest allowed `pos.y` before touching the floor
    pub fn floor_limit(&self) -> f32 {
        PLAYFIELD_HEIGHT - self.height
    }
}

/// A top/bottom pipe pair. The gap is fixed when the pipe spawns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Height of the top segment (= gap top)
    pub top_height: f32,
    pub gap: f32,
    /// Set once, when the pipe is fully behind the bird
    pub scored: bool,
}

impl Pipe {
    pub fn right(&self) -> f32 {
        self.x + PIPE_WIDTH
    }

    /// Y where the bottom segment starts
    pub fn gap_bottom(&self) -> f32 {
        self.top_height + self.gap
    }

    pub fn is_offscreen(&self) -> bool {
        self.right() < 0.0
    }
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Centre
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl Coin {
    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.radius < 0.0
    }
}

/// Per-run counters feeding challenge telemetry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTracker {
    pub jumps: u32,
    /// Frame counter value when the run started
    pub start_frame: u64,
    /// Cleared on the first pipe collision
    pub perfect_run: bool,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self {
            jumps: 0,
            start_frame: 0,
            perfect_run: true,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: RunPhase,
    /// Pipes passed this run
    pub score: u32,
    /// Coins collected this run
    pub coins: u32,
    /// Frames simulated this run
    pub frame_count: u64,
    /// Pipe speed used on the last frame (for presentation)
    pub speed: f32,
    pub bird: Bird,
    /// Oldest first
    pub pipes: VecDeque<Pipe>,
    pub coin_items: Vec<Coin>,
    pub tracker: RunTracker,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Idle,
            score: 0,
            coins: 0,
            frame_count: 0,
            speed: 0.0,
            bird: Bird::default(),
            pipes: VecDeque::new(),
            coin_items: Vec::new(),
            tracker: RunTracker::default(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Whole seconds survived this run
    pub fn elapsed_seconds(&self) -> u32 {
        let frames = self.frame_count.saturating_sub(self.tracker.start_frame);
        (frames / u64::from(FRAME_RATE)) as u32
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }
}
