#![deny(warnings)]

//! Core domain models and invariants for the idle economy.
//!
//! This crate defines the serializable value types shared by the economy
//! functions, the stateful runtime owners and the persistence layer, together
//! with the configuration they are driven by and validation helpers that
//! guarantee its basic invariants.

mod config;
mod currency;
mod error;
mod items;
mod mission;
mod skill;
mod stats;

pub use config::{
    validate_config, BuffConfig, CareerThreshold, EconConfig, FeverConfig, FeverDecay,
};
pub use currency::{Balance, CurrencyKind};
pub use error::{EconError, ValidationError};
pub use items::{ConsumableKind, ConsumableSpec, EquipmentKind, EquipmentSpec, Inventory};
pub use mission::{MissionDef, MissionId, MissionState, Reward};
pub use skill::{Career, GameKind, Skill, SkillKey, SkillTier, TierSpec};
pub use stats::{GameEvent, StatisticKey, Statistics};
