//! Game orchestrator
//!
//! Owns every piece of state (simulation, difficulty, challenges, theme,
//! skins, profile) together with the store and clock, and exposes the
//! discrete operations the presentation layer triggers.

use serde::Serialize;

use crate::challenges::{ChallengeManager, ChallengeReporter, DailyChallenge};
use crate::difficulty::{DifficultyController, DifficultyPreset};
use crate::persistence::KeyValueStore;
use crate::platform::Clock;
use crate::profile::{Profile, RunRecord};
use crate::sim::{GameState, RunPhase, TickInput, tick};
use crate::skins::{ReconcileTimer, Skin, SkinUnlocks, UnlockSnapshot};
use crate::theme::{Theme, ThemeState};

pub struct Game<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    state: GameState,
    difficulty: DifficultyController,
    challenges: ChallengeManager,
    theme: ThemeState,
    skins: SkinUnlocks,
    profile: Profile,
    reconcile_timer: ReconcileTimer,
    /// One-shot inputs queued for the next frame
    input: TickInput,
    last_phase: RunPhase,
}

impl<S: KeyValueStore, C: Clock> Game<S, C> {
    pub fn new(mut store: S, clock: C, seed: u64) -> Self {
        let difficulty = DifficultyController::load(&store);
        let mut challenges = ChallengeManager::load(&store, seed.rotate_left(17));
        challenges.generate_daily(clock.today(), &mut store);
        let profile = Profile::load(&store);
        let skins = SkinUnlocks::load(&store);

        let mut game = Self {
            store,
            clock,
            state: GameState::new(seed),
            difficulty,
            challenges,
            theme: ThemeState::default(),
            skins,
            profile,
            reconcile_timer: ReconcileTimer::default(),
            input: TickInput::default(),
            last_phase: RunPhase::Idle,
        };
        game.reconcile_unlocks();
        game
    }

    /// Queue a jump (starts the run when idle)
    pub fn jump(&mut self) {
        self.input.jump = true;
    }

    /// Queue a restart
    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    /// Run one simulation frame
    pub fn frame(&mut self) {
        let input = std::mem::take(&mut self.input);
        let starting = input.restart || (input.jump && self.state.phase == RunPhase::Idle);
        if starting {
            self.refresh_daily();
        }

        {
            let mut reporter = ChallengeReporter {
                manager: &mut self.challenges,
                store: &mut self.store,
            };
            tick(&mut self.state, &input, &mut self.difficulty, &mut reporter);
        }

        let phase = self.state.phase;
        if starting && phase == RunPhase::Running {
            self.theme.reset();
        }
        self.theme.on_score(self.state.score);

        if self.last_phase == RunPhase::Running && phase == RunPhase::Ended {
            self.finish_run();
        }
        self.last_phase = phase;
    }

    /// Advance the background reconciliation timer. Returns true when a
    /// reconciliation pass ran.
    pub fn advance_timers(&mut self, dt: f32) -> bool {
        if self.reconcile_timer.advance(dt) {
            self.reconcile_unlocks();
            return true;
        }
        false
    }

    fn finish_run(&mut self) {
        let record = RunRecord {
            score: self.state.score,
            coins: self.state.coins,
            preset: self.difficulty.preset(),
            day: self.clock.today(),
        };
        if let Some(rank) = self.profile.record_run(record) {
            log::info!("New leaderboard entry at #{rank}");
        }
        self.profile.save(&mut self.store);
        self.reconcile_unlocks();
    }

    /// Regenerate challenges if the calendar day rolled over
    pub fn refresh_daily(&mut self) -> bool {
        let today = self.clock.today();
        self.challenges.generate_daily(today, &mut self.store)
    }

    /// Progress the unlocks depend on, including the run in flight
    pub fn unlock_snapshot(&self) -> UnlockSnapshot {
        UnlockSnapshot {
            best_score: self.profile.best_score.max(self.state.score),
            coins: self.profile.banked_coins
                + self.challenges.total_coins_earned()
                + if self.state.is_running() { self.state.coins } else { 0 },
        }
    }

    /// Union newly earned skins into the unlock set
    pub fn reconcile_unlocks(&mut self) -> Vec<Skin> {
        let fresh = self.skins.reconcile(self.unlock_snapshot());
        if !fresh.is_empty() {
            self.skins.save(&mut self.store);
        }
        fresh
    }

    pub fn select_skin(&mut self, skin: Skin) -> bool {
        let selected = self.skins.select(skin);
        if selected {
            self.skins.save(&mut self.store);
        }
        selected
    }

    /// Apply a difficulty preset by name (unknown names mean `normal`)
    pub fn select_difficulty(&mut self, name: &str) {
        self.difficulty.apply_preset(name, &mut self.store);
    }

    pub fn set_adaptive(&mut self, enabled: bool) {
        self.difficulty.set_adaptive_enabled(enabled, &mut self.store);
    }

    pub fn cycle_theme(&mut self) -> Theme {
        self.theme.cycle()
    }

    /// Claim a challenge reward. Returns 0 if there is nothing to claim.
    pub fn claim_challenge(&mut self, id: &str) -> u32 {
        self.refresh_daily();
        let today = self.clock.today();
        let payout = self.challenges.complete_challenge(id, today, &mut self.store);
        if payout > 0 {
            self.reconcile_unlocks();
        }
        payout
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn challenges(&self) -> &ChallengeManager {
        &self.challenges
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn skins(&self) -> &SkinUnlocks {
        &self.skins
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> FrameSnapshot {
        let state = &self.state;
        FrameSnapshot {
            phase: state.phase,
            score: state.score,
            coins: state.coins,
            bird: RectView {
                x: state.bird.pos.x,
                y: state.bird.pos.y,
                width: state.bird.width,
                height: state.bird.height,
            },
            pipes: state
                .pipes
                .iter()
                .map(|p| PipeView {
                    x: p.x,
                    top_height: p.top_height,
                    gap_bottom: p.gap_bottom(),
                })
                .collect(),
            coin_items: state
                .coin_items
                .iter()
                .map(|c| CoinView {
                    x: c.pos.x,
                    y: c.pos.y,
                    radius: c.radius,
                })
                .collect(),
            theme: self.theme.current(),
            skin: self.skins.selected(),
            difficulty: self.difficulty.preset(),
            adaptive_enabled: self.difficulty.adaptive_enabled(),
            adaptive_level: self.difficulty.adaptive_level(),
            speed: self.difficulty.current_speed(),
            best_score: self.profile.best_score,
            streak: self.challenges.streak(),
            total_coins_earned: self.challenges.total_coins_earned(),
            challenges: self
                .challenges
                .challenges()
                .iter()
                .map(ChallengeView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeView {
    pub x: f32,
    pub top_height: f32,
    pub gap_bottom: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeView {
    pub id: String,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: String,
    pub progress: u32,
    pub target: u32,
    pub percent: f32,
    pub reward: u32,
    pub completed: bool,
}

impl From<&DailyChallenge> for ChallengeView {
    fn from(challenge: &DailyChallenge) -> Self {
        let template = challenge.template();
        Self {
            id: challenge.id.clone(),
            name: template.name,
            icon: template.icon,
            description: challenge.description(),
            progress: challenge.progress,
            target: challenge.target,
            percent: challenge.progress_percentage(),
            reward: challenge.reward(),
            completed: challenge.completed,
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub phase: RunPhase,
    pub score: u32,
    pub coins: u32,
    pub bird: RectView,
    pub pipes: Vec<PipeView>,
    pub coin_items: Vec<CoinView>,
    pub theme: Theme,
    pub skin: Skin,
    pub difficulty: DifficultyPreset,
    pub adaptive_enabled: bool,
    pub adaptive_level: u32,
    pub speed: f32,
    pub best_score: u32,
    pub streak: u32,
    pub total_coins_earned: u32,
    pub challenges: Vec<ChallengeView>,
}
