//! Leveled skills keyed by game and tier.

use crate::sync::lock;
use idle_core::{EconConfig, EconError, GameKind, Skill, SkillKey, SkillTier, TierSpec};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Owner of a player's skill levels.
#[derive(Debug)]
pub struct SkillRegistry {
    config: Arc<EconConfig>,
    levels: Mutex<BTreeMap<SkillKey, u32>>,
}

impl SkillRegistry {
    /// Fresh registry with every beginner skill at its starting level.
    pub fn new(config: Arc<EconConfig>) -> Self {
        let start = config
            .tier(SkillTier::Beginner)
            .map(|t| t.min_level)
            .unwrap_or(1);
        let levels = GameKind::all()
            .iter()
            .map(|g| (SkillKey::new(*g, SkillTier::Beginner), start))
            .collect();
        Self {
            config,
            levels: Mutex::new(levels),
        }
    }

    /// Registry rebuilt from saved skills, clamping levels into tier range.
    pub fn from_skills<I: IntoIterator<Item = Skill>>(config: Arc<EconConfig>, skills: I) -> Self {
        let levels = skills
            .into_iter()
            .map(|s| {
                let level = match config.tier(s.key.tier) {
                    Some(t) => s.level.clamp(t.min_level, t.max_level),
                    None => s.level,
                };
                (s.key, level)
            })
            .collect();
        Self {
            config,
            levels: Mutex::new(levels),
        }
    }

    pub fn get(&self, key: SkillKey) -> Option<Skill> {
        lock(&self.levels).get(&key).map(|l| Skill::new(key, *l))
    }

    pub fn skills(&self) -> Vec<Skill> {
        lock(&self.levels)
            .iter()
            .map(|(k, l)| Skill::new(*k, *l))
            .collect()
    }

    /// Skills trained for `game`.
    pub fn skills_for(&self, game: GameKind) -> Vec<Skill> {
        lock(&self.levels)
            .iter()
            .filter(|(k, _)| k.game == game)
            .map(|(k, l)| Skill::new(*k, *l))
            .collect()
    }

    fn spec(&self, tier: SkillTier) -> Option<&TierSpec> {
        self.config.tier(tier)
    }

    fn check_upgradable(&self, key: SkillKey, level: u32) -> Result<&TierSpec, EconError> {
        match self.spec(key.tier) {
            Some(spec) if !Skill::new(key, level).is_max(spec) => Ok(spec),
            Some(spec) => Err(EconError::LevelExceeded {
                key,
                max_level: spec.max_level,
            }),
            None => Err(EconError::LevelExceeded {
                key,
                max_level: level,
            }),
        }
    }

    /// Current level and the price of the next upgrade.
    ///
    /// Fails with `SkillLocked` or `LevelExceeded` exactly when `upgrade`
    /// would.
    pub fn quote_upgrade(&self, key: SkillKey) -> Result<(u32, u64), EconError> {
        let level = self.get(key).ok_or(EconError::SkillLocked(key))?.level;
        let spec = self.check_upgradable(key, level)?;
        Ok((level, idle_econ::upgrade_cost(spec, level)))
    }

    /// Raises the skill by exactly one level.
    pub fn upgrade(&self, key: SkillKey) -> Result<Skill, EconError> {
        let mut levels = lock(&self.levels);
        let level = levels.get_mut(&key).ok_or(EconError::SkillLocked(key))?;
        self.check_upgradable(key, *level)?;
        *level += 1;
        self.debug_check_range(key, *level);
        debug!(%key, level = *level, "skill upgraded");
        Ok(Skill::new(key, *level))
    }

    /// Upgrades only if the skill is still at `expected`.
    ///
    /// `Ok(None)` means another upgrade got there first.
    pub fn upgrade_from(&self, key: SkillKey, expected: u32) -> Result<Option<Skill>, EconError> {
        let mut levels = lock(&self.levels);
        let level = levels.get_mut(&key).ok_or(EconError::SkillLocked(key))?;
        if *level != expected {
            return Ok(None);
        }
        self.check_upgradable(key, *level)?;
        *level += 1;
        self.debug_check_range(key, *level);
        debug!(%key, level = *level, "skill upgraded");
        Ok(Some(Skill::new(key, *level)))
    }

    fn debug_check_range(&self, key: SkillKey, level: u32) {
        debug_assert!(
            self.spec(key.tier)
                .map_or(true, |t| (t.min_level..=t.max_level).contains(&level)),
            "{key} left its tier range at level {level}"
        );
    }

    /// Adds a skill at its tier's starting level.
    pub fn unlock(&self, key: SkillKey) -> Result<Skill, EconError> {
        let start = self.spec(key.tier).map(|t| t.min_level).unwrap_or(1);
        let mut levels = lock(&self.levels);
        if levels.contains_key(&key) {
            return Err(EconError::AlreadyUnlocked(key));
        }
        levels.insert(key, start);
        debug!(%key, "skill unlocked");
        Ok(Skill::new(key, start))
    }

    pub fn is_unlocked(&self, key: SkillKey) -> bool {
        lock(&self.levels).contains_key(&key)
    }
}
