//! Cosmetic bird skins
//!
//! Unlocks are re-checked periodically against a snapshot of the player's
//! best score and coin total. The unlock set only ever grows, so running a
//! reconciliation twice, or with stale snapshots, is harmless.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, keys, load_json, save_json};

/// How often unlocks are reconciled (seconds)
pub const RECONCILE_PERIOD_SECS: f32 = 2.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Classic,
    Robin,
    Golden,
    Phoenix,
    Ghost,
}

/// What it takes to unlock a skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Free,
    BestScore(u32),
    Coins(u32),
}

impl Skin {
    pub const ALL: [Skin; 5] = [
        Skin::Classic,
        Skin::Robin,
        Skin::Golden,
        Skin::Phoenix,
        Skin::Ghost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::Classic => "classic",
            Skin::Robin => "robin",
            Skin::Golden => "golden",
            Skin::Phoenix => "phoenix",
            Skin::Ghost => "ghost",
        }
    }

    pub fn requirement(&self) -> Requirement {
        match self {
            Skin::Classic => Requirement::Free,
            Skin::Robin => Requirement::BestScore(10),
            Skin::Golden => Requirement::Coins(50),
            Skin::Phoenix => Requirement::BestScore(25),
            Skin::Ghost => Requirement::Coins(150),
        }
    }

    pub fn is_earned(&self, snapshot: UnlockSnapshot) -> bool {
        match self.requirement() {
            Requirement::Free => true,
            Requirement::BestScore(score) => snapshot.best_score >= score,
            Requirement::Coins(coins) => snapshot.coins >= coins,
        }
    }
}

/// Immutable view of the progress unlocks depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnlockSnapshot {
    pub best_score: u32,
    pub coins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinUnlocks {
    #[serde(default)]
    unlocked: BTreeSet<Skin>,
    #[serde(default)]
    selected: Skin,
}

impl Default for SkinUnlocks {
    fn default() -> Self {
        Self {
            unlocked: BTreeSet::from([Skin::Classic]),
            selected: Skin::Classic,
        }
    }
}

impl SkinUnlocks {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut unlocks = match load_json::<SkinUnlocks, _>(store, keys::UNLOCKED_SKINS) {
            Ok(Some(unlocks)) => unlocks,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Resetting skin unlocks: {e}");
                Self::default()
            }
        };
        unlocks.unlocked.insert(Skin::Classic);
        if !unlocks.unlocked.contains(&unlocks.selected) {
            unlocks.selected = Skin::Classic;
        }
        unlocks
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        if let Err(e) = save_json(store, keys::UNLOCKED_SKINS, self) {
            log::warn!("Failed to save skin unlocks: {e}");
        }
    }

    /// Union in every skin the snapshot has earned. Returns the newly
    /// unlocked skins.
    pub fn reconcile(&mut self, snapshot: UnlockSnapshot) -> Vec<Skin> {
        let fresh: Vec<Skin> = Skin::ALL
            .into_iter()
            .filter(|skin| skin.is_earned(snapshot) && !self.unlocked.contains(skin))
            .collect();
        self.unlocked.extend(fresh.iter().copied());
        for skin in &fresh {
            log::info!("Unlocked skin: {}", skin.as_str());
        }
        fresh
    }

    /// Select an unlocked skin. Returns false if it is still locked.
    pub fn select(&mut self, skin: Skin) -> bool {
        if !self.unlocked.contains(&skin) {
            return false;
        }
        self.selected = skin;
        true
    }

    pub fn is_unlocked(&self, skin: Skin) -> bool {
        self.unlocked.contains(&skin)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Skin> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn selected(&self) -> Skin {
        self.selected
    }
}

/// Fires every `RECONCILE_PERIOD_SECS`, independent of the frame step
#[derive(Debug, Clone)]
pub struct ReconcileTimer {
    period: f32,
    elapsed: f32,
}

impl Default for ReconcileTimer {
    fn default() -> Self {
        Self::new(RECONCILE_PERIOD_SECS)
    }
}

impl ReconcileTimer {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds. Returns true when a pass is due.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.period {
            self.elapsed %= self.period;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_classic_always_unlocked() {
        let unlocks = SkinUnlocks::default();
        assert!(unlocks.is_unlocked(Skin::Classic));
        assert_eq!(unlocks.selected(), Skin::Classic);
    }

    #[test]
    fn test_reconcile_unlocks_by_score_and_coins() {
        let mut unlocks = SkinUnlocks::default();
        let fresh = unlocks.reconcile(UnlockSnapshot {
            best_score: 12,
            coins: 60,
        });
        assert_eq!(fresh, vec![Skin::Robin, Skin::Golden]);
        assert!(!unlocks.is_unlocked(Skin::Phoenix));

        // Nothing new on a repeat pass
        assert!(unlocks
            .reconcile(UnlockSnapshot {
                best_score: 12,
                coins: 60,
            })
            .is_empty());
    }

    #[test]
    fn test_stale_snapshot_never_revokes() {
        let mut unlocks = SkinUnlocks::default();
        unlocks.reconcile(UnlockSnapshot {
            best_score: 30,
            coins: 0,
        });
        unlocks.reconcile(UnlockSnapshot::default());
        assert!(unlocks.is_unlocked(Skin::Phoenix));
    }

    #[test]
    fn test_select_requires_unlock() {
        let mut unlocks = SkinUnlocks::default();
        assert!(!unlocks.select(Skin::Ghost));
        unlocks.reconcile(UnlockSnapshot {
            best_score: 0,
            coins: 150,
        });
        assert!(unlocks.select(Skin::Ghost));
        assert_eq!(unlocks.selected(), Skin::Ghost);
    }

    #[test]
    fn test_load_repairs_selection() {
        let mut store = MemoryStore::new();
        store
            .set(keys::UNLOCKED_SKINS, r#"{"unlocked":["robin"],"selected":"ghost"}"#)
            .unwrap();
        let unlocks = SkinUnlocks::load(&store);
        assert!(unlocks.is_unlocked(Skin::Classic));
        assert!(unlocks.is_unlocked(Skin::Robin));
        assert_eq!(unlocks.selected(), Skin::Classic);
    }

    #[test]
    fn test_timer_fires_on_period() {
        let mut timer = ReconcileTimer::new(2.0);
        assert!(!timer.advance(1.0));
        assert!(timer.advance(1.0));
        assert!(!timer.advance(0.5));
        assert!(timer.advance(1.75));
    }

    proptest! {
        #[test]
        fn prop_reconcile_order_independent(
            snapshots in prop::collection::vec((0u32..40, 0u32..200), 0..12),
        ) {
            let snapshots: Vec<UnlockSnapshot> = snapshots
                .into_iter()
                .map(|(best_score, coins)| UnlockSnapshot { best_score, coins })
                .collect();

            let mut forward = SkinUnlocks::default();
            for s in &snapshots {
                forward.reconcile(*s);
            }
            let mut backward = SkinUnlocks::default();
            for s in snapshots.iter().rev() {
                backward.reconcile(*s);
                backward.reconcile(*s);
            }
            prop_assert_eq!(forward, backward);
        }
    }
}
