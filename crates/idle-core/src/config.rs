use crate::{
    Career, ConsumableKind, ConsumableSpec, CurrencyKind, EquipmentKind, EquipmentSpec,
    MissionDef, MissionId, Reward, SkillTier, StatisticKey, TierSpec, ValidationError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How far the fever level falls on each decay tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeverDecay {
    /// Fixed number of levels per tick.
    Step(u32),
    /// Percentage of the current level per tick, rounded up, at least one.
    Percent(u8),
}

impl FeverDecay {
    /// Levels removed by one tick at `level`.
    pub fn amount(&self, level: u32) -> u32 {
        match *self {
            FeverDecay::Step(n) => n.max(1),
            FeverDecay::Percent(p) => {
                let scaled = u64::from(level) * u64::from(p);
                let levels = scaled.div_ceil(100);
                u32::try_from(levels).unwrap_or(u32::MAX).max(1)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeverConfig {
    pub max_level: u32,
    /// Levels gained per qualifying action.
    pub gain_per_action: u32,
    pub decay: FeverDecay,
    pub decay_interval_ms: u64,
    /// Multiplier per level; levels past the end are neutral.
    pub multipliers: Vec<Decimal>,
}

impl Default for FeverConfig {
    fn default() -> Self {
        Self {
            max_level: 5,
            gain_per_action: 1,
            decay: FeverDecay::Step(1),
            decay_interval_ms: 1_000,
            multipliers: vec![
                Decimal::ONE,
                Decimal::new(12, 1),
                Decimal::new(15, 1),
                Decimal::new(2, 0),
                Decimal::new(25, 1),
                Decimal::new(3, 0),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffConfig {
    /// Wall-clock length of one buff tick.
    pub tick_interval_ms: u64,
}

impl Default for BuffConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
        }
    }
}

/// Total gold earned required for a career rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerThreshold {
    pub career: Career,
    pub total_earned: u64,
}

/// Every tunable of the economy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconConfig {
    pub fever: FeverConfig,
    pub buff: BuffConfig,
    /// Period of the passive equipment yield.
    pub auto_gain_interval_ms: u64,
    pub tiers: BTreeMap<SkillTier, TierSpec>,
    pub consumables: BTreeMap<ConsumableKind, ConsumableSpec>,
    pub equipment: BTreeMap<EquipmentKind, EquipmentSpec>,
    /// Ascending by `total_earned`.
    pub careers: Vec<CareerThreshold>,
    pub missions: Vec<MissionDef>,
    pub starting_gold: u64,
    pub starting_diamond: u64,
}

impl EconConfig {
    pub fn tier(&self, tier: SkillTier) -> Option<&TierSpec> {
        self.tiers.get(&tier)
    }

    /// Highest rank whose threshold `total_earned` reaches.
    pub fn career_for(&self, total_earned: u64) -> Career {
        self.careers
            .iter()
            .take_while(|t| total_earned >= t.total_earned)
            .last()
            .map(|t| t.career)
            .unwrap_or_default()
    }
}

fn tier_spec(
    min_level: u32,
    max_level: u32,
    base_reward: u64,
    reward_per_level: u64,
    base_cost: u64,
    cost_growth: Decimal,
    unlock_cost: u64,
) -> TierSpec {
    TierSpec {
        min_level,
        max_level,
        base_reward,
        reward_per_level,
        base_cost,
        cost_growth,
        unlock_cost,
    }
}

fn mission(
    id: u32,
    title: &str,
    statistic: StatisticKey,
    target: u64,
    currency: CurrencyKind,
    amount: u64,
) -> MissionDef {
    MissionDef {
        id: MissionId(id),
        title: title.to_string(),
        statistic,
        target,
        reward: Reward { currency, amount },
    }
}

impl Default for EconConfig {
    fn default() -> Self {
        use CurrencyKind::{Diamond, Gold};
        use StatisticKey::*;

        let tiers = BTreeMap::from([
            (
                SkillTier::Beginner,
                tier_spec(1, 10, 1, 1, 10, Decimal::new(115, 2), 0),
            ),
            (
                SkillTier::Intermediate,
                tier_spec(1, 20, 5, 2, 200, Decimal::new(120, 2), 5),
            ),
            (
                SkillTier::Advanced,
                tier_spec(1, 30, 20, 5, 2_500, Decimal::new(125, 2), 20),
            ),
            (
                SkillTier::Expert,
                tier_spec(1, 50, 100, 20, 40_000, Decimal::new(130, 2), 60),
            ),
        ]);
        let consumables = BTreeMap::from([
            (
                ConsumableKind::Coffee,
                ConsumableSpec {
                    multiplier: Decimal::new(15, 1),
                    duration_ticks: 30,
                    price: 100,
                },
            ),
            (
                ConsumableKind::EnergyDrink,
                ConsumableSpec {
                    multiplier: Decimal::new(2, 0),
                    duration_ticks: 60,
                    price: 500,
                },
            ),
            (
                ConsumableKind::Vacation,
                ConsumableSpec {
                    multiplier: Decimal::new(3, 0),
                    duration_ticks: 300,
                    price: 5_000,
                },
            ),
        ]);
        let equipment = BTreeMap::from([
            (
                EquipmentKind::Keyboard,
                EquipmentSpec {
                    per_second: 1,
                    price: 150,
                },
            ),
            (
                EquipmentKind::Monitor,
                EquipmentSpec {
                    per_second: 5,
                    price: 1_000,
                },
            ),
            (
                EquipmentKind::Chair,
                EquipmentSpec {
                    per_second: 20,
                    price: 6_000,
                },
            ),
            (
                EquipmentKind::Server,
                EquipmentSpec {
                    per_second: 100,
                    price: 40_000,
                },
            ),
        ]);
        let careers = vec![
            CareerThreshold {
                career: Career::Intern,
                total_earned: 0,
            },
            CareerThreshold {
                career: Career::Junior,
                total_earned: 1_000,
            },
            CareerThreshold {
                career: Career::Senior,
                total_earned: 25_000,
            },
            CareerThreshold {
                career: Career::Lead,
                total_earned: 250_000,
            },
            CareerThreshold {
                career: Career::Cto,
                total_earned: 5_000_000,
            },
        ];
        let missions = vec![
            mission(1, "First words", LanguageCorrectCount, 10, Gold, 50),
            mission(2, "Polyglot", LanguageCorrectCount, 500, Diamond, 5),
            mission(3, "Hello, world", CodingCorrectCount, 10, Gold, 50),
            mission(4, "Ship it", CodingCorrectCount, 500, Diamond, 5),
            mission(5, "Bug hunter", DebuggingCorrectCount, 10, Gold, 50),
            mission(6, "Packet sniffer", NetworkingCorrectCount, 10, Gold, 50),
            mission(7, "Pocket money", TotalEarnedMoney, 1_000, Gold, 200),
            mission(8, "Savings account", TotalEarnedMoney, 100_000, Diamond, 10),
            mission(9, "Big spender", TotalSpentMoney, 5_000, Diamond, 3),
            mission(10, "Caffeinated", ConsumablesUsed, 5, Gold, 300),
            mission(11, "Lifelong learner", SkillUpgrades, 20, Diamond, 5),
            mission(12, "Completionist", MissionsClaimed, 10, Diamond, 20),
        ];

        Self {
            fever: FeverConfig::default(),
            buff: BuffConfig::default(),
            auto_gain_interval_ms: 1_000,
            tiers,
            consumables,
            equipment,
            careers,
            missions,
            starting_gold: 0,
            starting_diamond: 0,
        }
    }
}

/// Validate the fever table and timing.
pub fn validate_fever(f: &FeverConfig) -> Result<(), ValidationError> {
    if f.max_level == 0 {
        return Err(ValidationError::InvalidFever("max_level must be > 0"));
    }
    if f.multipliers.is_empty() {
        return Err(ValidationError::InvalidFever("multiplier table is empty"));
    }
    if f.multipliers.iter().any(|m| m.is_sign_negative()) {
        return Err(ValidationError::NegativeMultiplier);
    }
    if f.decay_interval_ms == 0 {
        return Err(ValidationError::NonPositive("fever.decay_interval_ms"));
    }
    Ok(())
}

/// Validate one tier's level range and curves.
pub fn validate_tier(tier: SkillTier, spec: &TierSpec) -> Result<(), ValidationError> {
    if spec.min_level > spec.max_level {
        return Err(ValidationError::InvalidLevelRange(tier));
    }
    if spec.cost_growth < Decimal::ONE {
        return Err(ValidationError::DecreasingCost(tier));
    }
    Ok(())
}

/// Validate the whole configuration, including cross-references.
pub fn validate_config(cfg: &EconConfig) -> Result<(), ValidationError> {
    validate_fever(&cfg.fever)?;
    if cfg.buff.tick_interval_ms == 0 {
        return Err(ValidationError::NonPositive("buff.tick_interval_ms"));
    }
    if cfg.auto_gain_interval_ms == 0 {
        return Err(ValidationError::NonPositive("auto_gain_interval_ms"));
    }
    for tier in SkillTier::all() {
        let spec = cfg.tier(*tier).ok_or(ValidationError::MissingTier(*tier))?;
        validate_tier(*tier, spec)?;
    }
    for spec in cfg.consumables.values() {
        if spec.multiplier.is_sign_negative() {
            return Err(ValidationError::NegativeMultiplier);
        }
        if spec.duration_ticks == 0 {
            return Err(ValidationError::NonPositive("consumable duration_ticks"));
        }
    }
    if cfg
        .careers
        .windows(2)
        .any(|w| w[0].total_earned >= w[1].total_earned)
    {
        return Err(ValidationError::UnorderedCareer);
    }
    let mut ids: BTreeSet<MissionId> = BTreeSet::new();
    for m in &cfg.missions {
        if !ids.insert(m.id) {
            return Err(ValidationError::DuplicateMission(m.id));
        }
        if m.target == 0 {
            return Err(ValidationError::ZeroTarget(m.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_config_is_valid() {
        validate_config(&EconConfig::default()).unwrap();
    }

    #[test]
    fn config_json_roundtrip() {
        let cfg = EconConfig::default();
        let s = serde_json::to_string_pretty(&cfg).unwrap();
        let back: EconConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let back: EconConfig = serde_json::from_str(r#"{"starting_gold": 500}"#).unwrap();
        assert_eq!(back.starting_gold, 500);
        assert_eq!(back.missions.len(), EconConfig::default().missions.len());
    }

    #[test]
    fn rejects_duplicate_missions() {
        let mut cfg = EconConfig::default();
        let dup = cfg.missions[0].clone();
        cfg.missions.push(dup);
        assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::DuplicateMission(MissionId(1)))
        );
    }

    #[test]
    fn rejects_shrinking_cost_curve() {
        let mut cfg = EconConfig::default();
        if let Some(t) = cfg.tiers.get_mut(&SkillTier::Advanced) {
            t.cost_growth = Decimal::new(9, 1);
        }
        assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::DecreasingCost(SkillTier::Advanced))
        );
    }

    #[test]
    fn rejects_missing_tier() {
        let mut cfg = EconConfig::default();
        cfg.tiers.remove(&SkillTier::Expert);
        assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::MissingTier(SkillTier::Expert))
        );
    }

    #[test]
    fn career_thresholds() {
        let cfg = EconConfig::default();
        assert_eq!(cfg.career_for(0), Career::Intern);
        assert_eq!(cfg.career_for(999), Career::Intern);
        assert_eq!(cfg.career_for(1_000), Career::Junior);
        assert_eq!(cfg.career_for(u64::MAX), Career::Cto);
    }

    #[test]
    fn percent_decay_rounds_up() {
        assert_eq!(FeverDecay::Percent(50).amount(3), 2);
        assert_eq!(FeverDecay::Percent(10).amount(1), 1);
        assert_eq!(FeverDecay::Step(0).amount(5), 1);
    }

    proptest! {
        #[test]
        fn decay_is_positive_and_bounded(level in 1u32..10_000, p in 1u8..=100) {
            let amt = FeverDecay::Percent(p).amount(level);
            prop_assert!(amt >= 1);
            prop_assert!(amt <= level);
        }
    }
}
