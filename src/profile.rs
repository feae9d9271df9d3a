//! Lifetime player profile
//!
//! Persisted to storage: best score, banked coins and the top 10 runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyPreset;
use crate::persistence::{KeyValueStore, keys, load_json, save_json};

/// Maximum number of runs kept on the leaderboard
pub const MAX_RUN_RECORDS: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Pipes passed
    pub score: u32,
    /// Coins collected
    pub coins: u32,
    pub preset: DifficultyPreset,
    pub day: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub best_score: u32,
    /// Run coins banked across all runs
    #[serde(default)]
    pub banked_coins: u32,
    #[serde(default)]
    pub runs_played: u32,
    /// Sorted descending by score
    #[serde(default)]
    pub leaderboard: Vec<RunRecord>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.leaderboard.len() < MAX_RUN_RECORDS {
            return true;
        }
        // Check if score beats the lowest entry
        self.leaderboard
            .last()
            .map(|e| score > e.score)
            .unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.leaderboard.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.leaderboard.len()) + 1)
    }

    /// Bank a finished run. Returns the leaderboard rank (1-indexed) or None
    /// if the run didn't place.
    pub fn record_run(&mut self, record: RunRecord) -> Option<usize> {
        self.runs_played += 1;
        self.banked_coins += record.coins;
        self.best_score = self.best_score.max(record.score);

        if !self.qualifies(record.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.leaderboard.iter().position(|e| record.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.leaderboard.insert(i, record);
                i + 1
            }
            None => {
                self.leaderboard.push(record);
                self.leaderboard.len()
            }
        };

        self.leaderboard.truncate(MAX_RUN_RECORDS);

        Some(rank)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.leaderboard.first().map(|e| e.score)
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match load_json::<Profile, _>(store, keys::PROFILE) {
            Ok(Some(profile)) => {
                log::info!(
                    "Loaded profile ({} runs, best {})",
                    profile.runs_played,
                    profile.best_score
                );
                profile
            }
            Ok(None) => {
                log::info!("No profile found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Resetting profile: {e}");
                Self::new()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        match save_json(store, keys::PROFILE, self) {
            Ok(()) => log::info!("Profile saved ({} runs)", self.runs_played),
            Err(e) => log::warn!("Failed to save profile: {e}"),
        }
    }
}
