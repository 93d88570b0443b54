use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Mini-games a player can perform actions in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Language,
    Coding,
    Debugging,
    Networking,
}

impl GameKind {
    /// All games in display order.
    pub fn all() -> &'static [GameKind] {
        &[
            GameKind::Language,
            GameKind::Coding,
            GameKind::Debugging,
            GameKind::Networking,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameKind::Language => "language",
            GameKind::Coding => "coding",
            GameKind::Debugging => "debugging",
            GameKind::Networking => "networking",
        }
    }
}

/// Skill tiers; each has its own level range and curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillTier {
    pub fn all() -> &'static [SkillTier] {
        &[
            SkillTier::Beginner,
            SkillTier::Intermediate,
            SkillTier::Advanced,
            SkillTier::Expert,
        ]
    }
}

/// Level range and curves of one tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Level a freshly unlocked skill starts at.
    pub min_level: u32,
    /// Highest reachable level (inclusive).
    pub max_level: u32,
    /// Reward contribution at `min_level`.
    pub base_reward: u64,
    /// Added contribution per level above `min_level`.
    pub reward_per_level: u64,
    /// Cost of the upgrade from `min_level`.
    pub base_cost: u64,
    /// Geometric growth of the cost per level (>= 1).
    pub cost_growth: Decimal,
    /// Diamonds required to unlock a skill of this tier.
    pub unlock_cost: u64,
}

/// Identity of a skill: one per game and tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SkillKey {
    pub game: GameKind,
    pub tier: SkillTier,
}

impl SkillKey {
    pub fn new(game: GameKind, tier: SkillTier) -> Self {
        Self { game, tier }
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.game.name(), self.tier)
    }
}

/// A leveled skill.
///
/// Equality and hashing only consider the key: two records with the same key
/// are the same skill observed at different levels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Skill {
    pub key: SkillKey,
    pub level: u32,
}

impl Skill {
    pub fn new(key: SkillKey, level: u32) -> Self {
        Self { key, level }
    }

    pub fn is_max(&self, spec: &TierSpec) -> bool {
        self.level >= spec.max_level
    }
}

impl PartialEq for Skill {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Skill {}

impl Hash for Skill {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Career rank, promoted from total gold earned. Never demoted.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Career {
    #[default]
    Intern,
    Junior,
    Senior,
    Lead,
    Cto,
}
