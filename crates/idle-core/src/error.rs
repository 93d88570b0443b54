use crate::{CurrencyKind, MissionId, MissionState, SkillKey};
use thiserror::Error;

/// Recoverable failures of economy operations.
///
/// Every variant is returned before any state is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EconError {
    /// Spend rejected because the balance does not cover it.
    #[error("insufficient {currency:?}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        currency: CurrencyKind,
        balance: u64,
        requested: u64,
    },
    /// Skill is already at its tier's maximum level.
    #[error("skill {key} is already at max level {max_level}")]
    LevelExceeded { key: SkillKey, max_level: u32 },
    /// A buff is already running.
    #[error("a buff is already active")]
    AlreadyActive,
    /// Claim attempted outside the claimable state.
    #[error("mission {id} is not claimable (state: {state:?})")]
    NotClaimable { id: MissionId, state: MissionState },
    /// Repository I/O failed; propagated to the caller, never retried.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
    /// Consumable requested that the inventory does not hold.
    #[error("no {0:?} left in inventory")]
    OutOfStock(crate::ConsumableKind),
    /// Mission id not present in the catalog.
    #[error("unknown mission {0}")]
    UnknownMission(MissionId),
    /// Skill has not been unlocked yet.
    #[error("skill {0} is locked")]
    SkillLocked(SkillKey),
    /// Skill unlock attempted twice.
    #[error("skill {0} is already unlocked")]
    AlreadyUnlocked(SkillKey),
    /// Equipment is unique per player.
    #[error("{0:?} is already owned")]
    AlreadyOwned(crate::EquipmentKind),
    /// Item missing from the configured catalog.
    #[error("{0} is not for sale")]
    NotForSale(String),
}

/// Validation errors for configuration invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Fever configuration is unusable.
    #[error("invalid fever config: {0}")]
    InvalidFever(&'static str),
    /// Tick intervals and durations must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositive(&'static str),
    /// Tier level range is empty.
    #[error("tier {0:?} has min_level > max_level")]
    InvalidLevelRange(crate::SkillTier),
    /// Cost curve would decrease with level.
    #[error("tier {0:?} cost growth must be >= 1")]
    DecreasingCost(crate::SkillTier),
    /// Multipliers must be non-negative.
    #[error("negative multiplier is invalid")]
    NegativeMultiplier,
    /// Tier referenced but not configured.
    #[error("tier {0:?} is not configured")]
    MissingTier(crate::SkillTier),
    /// Two missions share an id.
    #[error("duplicate mission id: {0}")]
    DuplicateMission(MissionId),
    /// Mission target must be >= 1.
    #[error("mission {0} has a zero target")]
    ZeroTarget(MissionId),
    /// Career thresholds must be ascending.
    #[error("career thresholds must be strictly ascending")]
    UnorderedCareer,
}
