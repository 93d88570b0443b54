#![deny(warnings)]

//! Economic models: reward and cost curves for the idle economy.
//!
//! Everything here is a pure function of its inputs:
//! - Per-level reward contribution and upgrade cost of a skill tier
//! - Fever multiplier lookup
//! - Action yield combining skills with the fever and buff multipliers
//! - Passive per-second yield of owned equipment

use idle_core::{EconConfig, EquipmentKind, GameKind, Skill, TierSpec};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Reward a skill of this tier contributes at `level`.
///
/// Linear in the number of levels above `min_level`, saturating at `u64::MAX`.
///
/// Example:
/// with base_reward 5 and reward_per_level 2, level min+3 contributes 11.
pub fn reward_contribution(spec: &TierSpec, level: u32) -> u64 {
    let steps = u64::from(level.saturating_sub(spec.min_level));
    spec.base_reward
        .saturating_add(spec.reward_per_level.saturating_mul(steps))
}

/// Cost of upgrading a skill of this tier from `level` to `level + 1`.
///
/// base_cost * cost_growth^(level - min_level), floored. Non-decreasing in
/// level for any growth >= 1; saturates at `u64::MAX`.
pub fn upgrade_cost(spec: &TierSpec, level: u32) -> u64 {
    let mut cost = Decimal::from(spec.base_cost);
    for _ in spec.min_level..level {
        match cost.checked_mul(spec.cost_growth) {
            Some(next) => cost = next,
            None => return u64::MAX,
        }
    }
    floor_units(cost)
}

/// Multiplier for a fever level; levels outside the table are neutral.
pub fn fever_multiplier(table: &[Decimal], level: u32) -> Decimal {
    usize::try_from(level)
        .ok()
        .and_then(|i| table.get(i))
        .copied()
        .unwrap_or(Decimal::ONE)
}

/// Whole currency units in `value`, rounding toward zero.
///
/// Negative values credit nothing; values beyond `u64` saturate.
pub fn floor_units(value: Decimal) -> u64 {
    if value.is_sign_negative() {
        return 0;
    }
    value.floor().to_u64().unwrap_or(u64::MAX)
}

/// Sum of the reward contributions of the skills trained for `game`.
pub fn base_yield(skills: &[Skill], game: GameKind, cfg: &EconConfig) -> u64 {
    skills
        .iter()
        .filter(|s| s.key.game == game)
        .filter_map(|s| cfg.tier(s.key.tier).map(|t| reward_contribution(t, s.level)))
        .fold(0u64, u64::saturating_add)
}

/// Currency credited for one action in `game`.
///
/// floor(base_yield × fever × buff). Reading only; callers apply the result.
pub fn action_yield(
    skills: &[Skill],
    game: GameKind,
    cfg: &EconConfig,
    fever: Decimal,
    buff: Decimal,
) -> u64 {
    let base = Decimal::from(base_yield(skills, game, cfg));
    match base
        .checked_mul(fever)
        .and_then(|v| v.checked_mul(buff))
    {
        Some(v) => floor_units(v),
        None => u64::MAX,
    }
}

/// Passive gold per auto-gain tick from owned equipment. No multipliers.
pub fn passive_yield<'a, I>(equipment: I, cfg: &EconConfig) -> u64
where
    I: IntoIterator<Item = &'a EquipmentKind>,
{
    equipment
        .into_iter()
        .filter_map(|k| cfg.equipment.get(k))
        .map(|spec| spec.per_second)
        .fold(0u64, u64::saturating_add)
}
