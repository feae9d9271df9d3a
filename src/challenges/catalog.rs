//! Challenge kinds, difficulty tiers, templates and target ranges

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Telemetry signal a challenge tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    CollectCoins,
    SurviveTime,
    ScorePoints,
    PerfectRun,
    JumpCount,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::CollectCoins => "collect_coins",
            ChallengeKind::SurviveTime => "survive_time",
            ChallengeKind::ScorePoints => "score_points",
            ChallengeKind::PerfectRun => "perfect_run",
            ChallengeKind::JumpCount => "jump_count",
        }
    }

    /// Inclusive target range for a tier. `None` for kinds with a fixed target.
    pub fn target_range(&self, tier: ChallengeTier) -> Option<(u32, u32)> {
        use ChallengeTier::*;
        let range = match (self, tier) {
            (ChallengeKind::CollectCoins, Easy) => (5, 15),
            (ChallengeKind::CollectCoins, Medium) => (15, 25),
            (ChallengeKind::CollectCoins, Hard) => (25, 40),
            (ChallengeKind::SurviveTime, Easy) => (10, 20),
            (ChallengeKind::SurviveTime, Medium) => (20, 35),
            (ChallengeKind::SurviveTime, Hard) => (35, 60),
            (ChallengeKind::ScorePoints, Easy) => (5, 15),
            (ChallengeKind::ScorePoints, Medium) => (15, 30),
            (ChallengeKind::ScorePoints, Hard) => (30, 50),
            (ChallengeKind::JumpCount, Easy) => (10, 25),
            (ChallengeKind::JumpCount, Medium) => (25, 40),
            (ChallengeKind::JumpCount, Hard) => (40, 60),
            (ChallengeKind::PerfectRun, _) => return None,
        };
        Some(range)
    }

    pub fn template(&self) -> &'static ChallengeTemplate {
        // Every kind has exactly one template
        TEMPLATES
            .iter()
            .find(|t| t.kind == *self)
            .unwrap_or(&TEMPLATES[0])
    }
}

/// Target used when a kind has no range table
pub const DEFAULT_TARGET: u32 = 10;

/// Challenge difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeTier {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl ChallengeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeTier::Easy => "easy",
            ChallengeTier::Medium => "medium",
            ChallengeTier::Hard => "hard",
        }
    }

    /// Reward multiplier applied to the template's base reward
    pub fn multiplier(&self) -> f64 {
        match self {
            ChallengeTier::Easy => 1.0,
            ChallengeTier::Medium => 1.5,
            ChallengeTier::Hard => 2.0,
        }
    }

    /// Extra coins per streak day
    pub fn streak_bonus(&self) -> u32 {
        match self {
            ChallengeTier::Easy => 1,
            ChallengeTier::Medium => 2,
            ChallengeTier::Hard => 3,
        }
    }
}

/// Tier draw table: (tier, cumulative probability)
pub const TIER_WEIGHTS: [(ChallengeTier, f64); 3] = [
    (ChallengeTier::Easy, 0.5),
    (ChallengeTier::Medium, 0.8),
    (ChallengeTier::Hard, 1.0),
];

/// Pick from a cumulative-probability table with a roll in `[0, 1)`.
/// Rolls past the last bound land on the last entry.
pub fn weighted_choice<T: Copy>(table: &[(T, f64)], roll: f64) -> Option<T> {
    table
        .iter()
        .find(|(_, bound)| roll < *bound)
        .or_else(|| table.last())
        .map(|(item, _)| *item)
}

/// Draw a tier: 50% easy, 30% medium, 20% hard
pub fn roll_tier<R: Rng + ?Sized>(rng: &mut R) -> ChallengeTier {
    weighted_choice(&TIER_WEIGHTS, rng.random::<f64>()).unwrap_or_default()
}

/// Draw a target uniformly from the kind's range for this tier
pub fn roll_target<R: Rng + ?Sized>(
    rng: &mut R,
    kind: ChallengeKind,
    tier: ChallengeTier,
) -> u32 {
    match kind.target_range(tier) {
        Some((min, max)) => rng.random_range(min..=max),
        None => DEFAULT_TARGET,
    }
}

/// Static description of a challenge objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeTemplate {
    pub kind: ChallengeKind,
    pub name: &'static str,
    /// `{target}` is replaced with the challenge target
    pub description: &'static str,
    pub icon: &'static str,
    pub base_reward: u32,
}

pub const TEMPLATES: [ChallengeTemplate; 5] = [
    ChallengeTemplate {
        kind: ChallengeKind::CollectCoins,
        name: "Coin Collector",
        description: "Collect {target} coins in a single run",
        icon: "🪙",
        base_reward: 5,
    },
    ChallengeTemplate {
        kind: ChallengeKind::SurviveTime,
        name: "Survivor",
        description: "Survive for {target} seconds",
        icon: "⏱️",
        base_reward: 8,
    },
    ChallengeTemplate {
        kind: ChallengeKind::ScorePoints,
        name: "Score Master",
        description: "Score {target} points in a single run",
        icon: "🎯",
        base_reward: 10,
    },
    ChallengeTemplate {
        kind: ChallengeKind::PerfectRun,
        name: "Perfect Flight",
        description: "Complete a run without hitting any pipes",
        icon: "✨",
        base_reward: 15,
    },
    ChallengeTemplate {
        kind: ChallengeKind::JumpCount,
        name: "Jump Master",
        description: "Jump {target} times in a single run",
        icon: "🦘",
        base_reward: 6,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_weighted_choice_bounds() {
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 0.0), Some(ChallengeTier::Easy));
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 0.4999), Some(ChallengeTier::Easy));
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 0.5), Some(ChallengeTier::Medium));
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 0.7999), Some(ChallengeTier::Medium));
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 0.8), Some(ChallengeTier::Hard));
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 0.9999), Some(ChallengeTier::Hard));
        assert_eq!(weighted_choice(&TIER_WEIGHTS, 1.0), Some(ChallengeTier::Hard));
        assert_eq!(weighted_choice::<ChallengeTier>(&[], 0.3), None);
    }

    #[test]
    fn test_tier_distribution_roughly_matches_weights() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut counts = [0u32; 3];
        for _ in 0..10_000 {
            match roll_tier(&mut rng) {
                ChallengeTier::Easy => counts[0] += 1,
                ChallengeTier::Medium => counts[1] += 1,
                ChallengeTier::Hard => counts[2] += 1,
            }
        }
        assert!((4_500..5_500).contains(&counts[0]), "easy: {}", counts[0]);
        assert!((2_500..3_500).contains(&counts[1]), "medium: {}", counts[1]);
        assert!((1_500..2_500).contains(&counts[2]), "hard: {}", counts[2]);
    }

    #[test]
    fn test_targets_stay_in_range() {
        let mut rng = Pcg32::seed_from_u64(42);
        for template in &TEMPLATES {
            for tier in [ChallengeTier::Easy, ChallengeTier::Medium, ChallengeTier::Hard] {
                for _ in 0..50 {
                    let target = roll_target(&mut rng, template.kind, tier);
                    match template.kind.target_range(tier) {
                        Some((min, max)) => assert!((min..=max).contains(&target)),
                        None => assert_eq!(target, DEFAULT_TARGET),
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_kind_has_its_own_template() {
        for template in &TEMPLATES {
            assert_eq!(template.kind.template().name, template.name);
        }
    }
}
