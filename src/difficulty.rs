//! Difficulty presets and the adaptive ratchet
//!
//! Owns the pipe gap and pipe speed. Every few pipes passed (while adaptive
//! mode is on) speed grows and the gap shrinks, up to fixed limits. Only
//! re-applying a preset loosens them again.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, keys};

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyPreset {
    pub const ALL: [DifficultyPreset; 3] = [
        DifficultyPreset::Easy,
        DifficultyPreset::Normal,
        DifficultyPreset::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "easy",
            DifficultyPreset::Normal => "normal",
            DifficultyPreset::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "normal" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Base pipe gap (pixels)
    pub fn pipe_gap(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 190.0,
            DifficultyPreset::Normal => 150.0,
            DifficultyPreset::Hard => 120.0,
        }
    }

    /// Base pipe speed (pixels/frame)
    pub fn base_speed(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 1.6,
            DifficultyPreset::Normal => 2.2,
            DifficultyPreset::Hard => 3.0,
        }
    }
}

/// Adaptive ratchet tuning
pub mod adaptive {
    /// Ratchet fires every N pipes passed
    pub const INCREASE_EVERY_PIPES: u32 = 4;
    pub const SPEED_INCREASE_FACTOR: f32 = 1.06;
    pub const GAP_DECREASE_STEP: f32 = 6.0;
    pub const MAX_SPEED: f32 = 6.5;
    pub const MIN_GAP: f32 = 90.0;
}

/// Current difficulty state
#[derive(Debug, Clone)]
pub struct DifficultyController {
    preset: DifficultyPreset,
    gap: f32,
    speed: f32,
    adaptive_enabled: bool,
    adaptive_level: u32,
    pipes_passed: u32,
}

impl Default for DifficultyController {
    fn default() -> Self {
        let preset = DifficultyPreset::default();
        Self {
            preset,
            gap: preset.pipe_gap(),
            speed: preset.base_speed(),
            adaptive_enabled: true,
            adaptive_level: 0,
            pipes_passed: 0,
        }
    }
}

impl DifficultyController {
    /// Load the saved preset and adaptive toggle, falling back to `normal`
    /// with adaptive mode on.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut controller = Self::default();

        match store.get(keys::DIFFICULTY_PRESET) {
            Some(saved) => match DifficultyPreset::from_str(&saved) {
                Some(preset) => controller.reset_to(preset),
                None => log::warn!("Ignoring unknown saved difficulty {saved:?}"),
            },
            None => log::info!("No saved difficulty, using normal"),
        }

        if let Some(saved) = store.get(keys::ADAPTIVE_ENABLED) {
            controller.adaptive_enabled = saved.trim() == "true";
        }

        controller
    }

    /// Apply a preset by name. Unknown names fall back to `normal`.
    /// Resets the adaptive ratchet and persists the resolved name.
    pub fn apply_preset<S: KeyValueStore + ?Sized>(&mut self, name: &str, store: &mut S) {
        let preset = DifficultyPreset::from_str(name).unwrap_or_else(|| {
            log::warn!("Unknown difficulty {name:?}, falling back to normal");
            DifficultyPreset::Normal
        });
        self.select(preset, store);
    }

    /// Apply a preset, reset the ratchet and persist the choice
    pub fn select<S: KeyValueStore + ?Sized>(&mut self, preset: DifficultyPreset, store: &mut S) {
        self.reset_to(preset);
        if let Err(e) = store.set(keys::DIFFICULTY_PRESET, preset.as_str()) {
            log::warn!("Failed to save difficulty: {e}");
        }
        log::info!(
            "Difficulty set to {} (gap {}, speed {})",
            preset.as_str(),
            self.gap,
            self.speed
        );
    }

    /// Re-apply the selected preset without touching storage
    pub fn reset_adaptive(&mut self) {
        self.reset_to(self.preset);
    }

    fn reset_to(&mut self, preset: DifficultyPreset) {
        self.preset = preset;
        self.gap = preset.pipe_gap();
        self.speed = preset.base_speed();
        self.adaptive_level = 0;
        self.pipes_passed = 0;
    }

    /// Turn the ratchet on or off. Turning it off keeps prior tightening.
    pub fn set_adaptive_enabled<S: KeyValueStore + ?Sized>(
        &mut self,
        enabled: bool,
        store: &mut S,
    ) {
        self.adaptive_enabled = enabled;
        let value = if enabled { "true" } else { "false" };
        if let Err(e) = store.set(keys::ADAPTIVE_ENABLED, value) {
            log::warn!("Failed to save adaptive toggle: {e}");
        }
    }

    /// Record a passed pipe and step the ratchet every N pipes
    pub fn on_obstacle_passed(&mut self) {
        self.pipes_passed += 1;
        if !self.adaptive_enabled || self.pipes_passed % adaptive::INCREASE_EVERY_PIPES != 0 {
            return;
        }

        self.speed = (self.speed * adaptive::SPEED_INCREASE_FACTOR).min(adaptive::MAX_SPEED);
        self.gap = (self.gap - adaptive::GAP_DECREASE_STEP).max(adaptive::MIN_GAP);
        self.adaptive_level += 1;
        log::debug!(
            "Adaptive level {}: speed {:.3}, gap {}",
            self.adaptive_level,
            self.speed,
            self.gap
        );
    }

    pub fn current_gap(&self) -> f32 {
        self.gap
    }

    pub fn current_speed(&self) -> f32 {
        self.speed
    }

    pub fn adaptive_level(&self) -> u32 {
        self.adaptive_level
    }

    pub fn pipes_passed(&self) -> u32 {
        self.pipes_passed
    }

    pub fn adaptive_enabled(&self) -> bool {
        self.adaptive_enabled
    }

    pub fn preset(&self) -> DifficultyPreset {
        self.preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_unknown_preset_falls_back_to_normal() {
        let mut store = MemoryStore::new();
        let mut difficulty = DifficultyController::default();
        difficulty.apply_preset("nightmare", &mut store);
        assert_eq!(difficulty.preset(), DifficultyPreset::Normal);
        assert_eq!(difficulty.current_gap(), 150.0);
        assert_eq!(store.get(keys::DIFFICULTY_PRESET).as_deref(), Some("normal"));
    }

    #[test]
    fn test_ratchet_steps_every_four_pipes() {
        let mut difficulty = DifficultyController::default();
        for _ in 0..3 {
            difficulty.on_obstacle_passed();
        }
        assert_eq!(difficulty.adaptive_level(), 0);
        assert_eq!(difficulty.current_speed(), 2.2);

        difficulty.on_obstacle_passed();
        assert_eq!(difficulty.adaptive_level(), 1);
        assert!((difficulty.current_speed() - 2.332).abs() < 1e-4);
        assert_eq!(difficulty.current_gap(), 144.0);
    }

    #[test]
    fn test_forty_pipes_reach_level_ten() {
        let mut difficulty = DifficultyController::default();
        for _ in 0..40 {
            difficulty.on_obstacle_passed();
        }
        assert_eq!(difficulty.adaptive_level(), 10);
        assert_eq!(difficulty.current_gap(), 90.0);
        assert!(difficulty.current_speed() <= adaptive::MAX_SPEED);
        // 2.2 * 1.06^10 is still under the cap
        assert!((difficulty.current_speed() - 2.2 * 1.06f32.powi(10)).abs() < 1e-3);
    }

    #[test]
    fn test_disabled_ratchet_freezes_but_keeps_tightening() {
        let mut store = MemoryStore::new();
        let mut difficulty = DifficultyController::default();
        for _ in 0..4 {
            difficulty.on_obstacle_passed();
        }
        difficulty.set_adaptive_enabled(false, &mut store);
        for _ in 0..8 {
            difficulty.on_obstacle_passed();
        }
        assert_eq!(difficulty.adaptive_level(), 1);
        assert_eq!(difficulty.current_gap(), 144.0);
        assert_eq!(store.get(keys::ADAPTIVE_ENABLED).as_deref(), Some("false"));
    }

    #[test]
    fn test_preset_resets_ratchet() {
        let mut store = MemoryStore::new();
        let mut difficulty = DifficultyController::default();
        difficulty.select(DifficultyPreset::Hard, &mut store);
        for _ in 0..12 {
            difficulty.on_obstacle_passed();
        }
        assert_eq!(difficulty.adaptive_level(), 3);

        difficulty.select(DifficultyPreset::Hard, &mut store);
        assert_eq!(difficulty.adaptive_level(), 0);
        assert_eq!(difficulty.pipes_passed(), 0);
        assert_eq!(difficulty.current_gap(), 120.0);
        assert_eq!(difficulty.current_speed(), 3.0);
    }

    #[test]
    fn test_load_restores_saved_settings() {
        let mut store = MemoryStore::new();
        store.set(keys::DIFFICULTY_PRESET, "easy").unwrap();
        store.set(keys::ADAPTIVE_ENABLED, "false").unwrap();
        let difficulty = DifficultyController::load(&store);
        assert_eq!(difficulty.preset(), DifficultyPreset::Easy);
        assert_eq!(difficulty.current_gap(), 190.0);
        assert!(!difficulty.adaptive_enabled());
    }

    #[test]
    fn test_load_ignores_garbage() {
        let mut store = MemoryStore::new();
        store.set(keys::DIFFICULTY_PRESET, "{\"oops\":1}").unwrap();
        let difficulty = DifficultyController::load(&store);
        assert_eq!(difficulty.preset(), DifficultyPreset::Normal);
        assert!(difficulty.adaptive_enabled());
    }

    proptest! {
        #[test]
        fn prop_ratchet_stays_within_limits(preset_idx in 0usize..3, passes in 0u32..400) {
            let mut store = MemoryStore::new();
            let mut difficulty = DifficultyController::default();
            let preset = DifficultyPreset::ALL[preset_idx];
            difficulty.select(preset, &mut store);

            let mut last_speed = difficulty.current_speed();
            let mut last_gap = difficulty.current_gap();
            for _ in 0..passes {
                difficulty.on_obstacle_passed();
                prop_assert!(difficulty.current_speed() >= last_speed);
                prop_assert!(difficulty.current_gap() <= last_gap);
                prop_assert!(difficulty.current_speed() <= adaptive::MAX_SPEED);
                prop_assert!(difficulty.current_gap() >= adaptive::MIN_GAP);
                last_speed = difficulty.current_speed();
                last_gap = difficulty.current_gap();
            }
            prop_assert_eq!(difficulty.adaptive_level(), passes / adaptive::INCREASE_EVERY_PIPES);
        }
    }
}
