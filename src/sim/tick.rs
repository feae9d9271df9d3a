//! Frame-stepped simulation
//!
//! One `tick` per display frame. Difficulty and challenge progress are driven
//! synchronously from inside the step.

use glam::Vec2;
use rand::Rng;

use super::collision::{bird_coin_pickup, bird_pipe_collision};
use super::state::{Bird, Coin, GameState, Pipe, RunPhase, RunTracker};
use crate::challenges::{ChallengeKind, ProgressSink};
use crate::consts::*;
use crate::difficulty::DifficultyController;

/// One-shot inputs for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (starts the run when idle)
    pub jump: bool,
    /// Throw away the current run and start a new one
    pub restart: bool,
}

/// Reset run state and begin playing
pub fn start(state: &mut GameState, difficulty: &mut DifficultyController) {
    difficulty.reset_adaptive();

    state.score = 0;
    state.coins = 0;
    state.frame_count = 0;
    state.pipes.clear();
    state.coin_items.clear();
    state.bird.reset();
    state.tracker = RunTracker {
        start_frame: state.frame_count,
        ..Default::default()
    };
    state.speed = difficulty.current_speed();
    state.phase = RunPhase::Running;

    log::info!(
        "Run started ({} gap {}, speed {})",
        difficulty.preset().as_str(),
        difficulty.current_gap(),
        difficulty.current_speed()
    );
}

/// Flap. No-op unless running.
pub fn jump(state: &mut GameState, progress: &mut dyn ProgressSink) {
    if !state.is_running() {
        return;
    }
    state.bird.vel = JUMP_IMPULSE;
    state.tracker.jumps += 1;
    progress.report(ChallengeKind::JumpCount, state.tracker.jumps);
}

/// End the run. Repeated calls are no-ops.
pub fn end(state: &mut GameState, progress: &mut dyn ProgressSink) {
    if !state.is_running() {
        return;
    }
    state.phase = RunPhase::Ended;
    if state.tracker.perfect_run && state.score > 0 {
        progress.report(ChallengeKind::PerfectRun, 1);
    }
    log::info!(
        "Run ended: score {}, coins {}, {}s, {} jumps{}",
        state.score,
        state.coins,
        state.elapsed_seconds(),
        state.tracker.jumps,
        if state.tracker.perfect_run { " (no pipe hits)" } else { "" }
    );
}

/// Advance the game state by one frame
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    difficulty: &mut DifficultyController,
    progress: &mut dyn ProgressSink,
) {
    if input.restart {
        start(state, difficulty);
    }

    if input.jump {
        match state.phase {
            RunPhase::Idle => start(state, difficulty),
            RunPhase::Running => jump(state, progress),
            RunPhase::Ended => {}
        }
    }

    if !state.is_running() {
        return;
    }

    state.frame_count += 1;

    // Bird
    update_bird(&mut state.bird);
    if state.bird.pos.y > state.bird.floor_limit() {
        state.bird.pos.y = state.bird.floor_limit();
        end(state, progress);
        return;
    }

    let speed = difficulty.current_speed();
    state.speed = speed;

    // Pipes
    for pipe in state.pipes.iter_mut() {
        pipe.x -= speed;
        if !pipe.scored && pipe.right() < state.bird.left() {
            pipe.scored = true;
            state.score += 1;
            progress.report(ChallengeKind::ScorePoints, state.score);
            difficulty.on_obstacle_passed();
        }
    }
    while state.pipes.front().is_some_and(Pipe::is_offscreen) {
        state.pipes.pop_front();
    }
    if state.frame_count % PIPE_SPAWN_INTERVAL == 0 {
        spawn_pipe(state, difficulty.current_gap());
    }

    // Coins
    for coin in state.coin_items.iter_mut() {
        coin.pos.x -= speed;
        if bird_coin_pickup(&state.bird, coin) {
            coin.collected = true;
            state.coins += 1;
            progress.report(ChallengeKind::CollectCoins, state.coins);
        }
    }
    state.coin_items.retain(|c| !c.collected && !c.is_offscreen());
    if state.frame_count % COIN_SPAWN_INTERVAL == COIN_SPAWN_PHASE {
        spawn_coin(state);
    }

    // Collisions
    if state.pipes.iter().any(|p| bird_pipe_collision(&state.bird, p)) {
        state.tracker.perfect_run = false;
        end(state, progress);
        return;
    }

    progress.report(ChallengeKind::SurviveTime, state.elapsed_seconds());
}

/// Integrate gravity and clamp to the ceiling
fn update_bird(bird: &mut Bird) {
    bird.vel += GRAVITY;
    bird.pos.y += bird.vel;
    if bird.pos.y < 0.0 {
        bird.pos.y = 0.0;
        bird.vel = 0.0;
    }
}

/// Spawn a pipe at the right edge. Both segments keep the minimum clearance.
pub fn spawn_pipe(state: &mut GameState, gap: f32) {
    let min = PIPE_MIN_SEGMENT;
    let max = PLAYFIELD_HEIGHT - gap - PIPE_MIN_SEGMENT;
    let top_height = if max > min {
        state.rng.random_range(min..max)
    } else {
        min
    };
    let id = state.next_entity_id();
    state.pipes.push_back(Pipe {
        id,
        x: PLAYFIELD_WIDTH,
        top_height,
        gap,
        scored: false,
    });
}

/// Spawn a coin just past the right edge at a random height
pub fn spawn_coin(state: &mut GameState) {
    let y = state
        .rng
        .random_range(COIN_MARGIN..=PLAYFIELD_HEIGHT - COIN_MARGIN);
    let id = state.next_entity_id();
    state.coin_items.push(Coin {
        id,
        pos: Vec2::new(PLAYFIELD_WIDTH + COIN_SPAWN_OFFSET, y),
        radius: COIN_RADIUS,
        collected: false,
    });
}
