use crate::{PersistenceError, Result};
use chrono::{DateTime, Utc};
use idle_core::{Balance, Career, Inventory, MissionId, SkillKey, Statistics};
use serde::{Deserialize, Serialize};

/// Current snapshot layout. Bump when fields change meaning.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted level of one skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub key: SkillKey,
    pub level: u32,
}

/// Serialized state of a player: everything needed to rebuild it.
///
/// Timed state (fever level, running buff) is session-scoped and not saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub version: u32,
    pub id: String,
    pub nickname: String,
    pub career: Career,
    pub balances: Vec<Balance>,
    pub inventory: Inventory,
    pub statistics: Statistics,
    pub skills: Vec<SkillLevel>,
    #[serde(default)]
    pub claimed_missions: Vec<MissionId>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PlayerSnapshot {
    /// Stamps the snapshot with the current time.
    pub fn stamped(mut self) -> Self {
        self.saved_at = Some(Utc::now());
        self
    }

    fn check_version(&self) -> Result<()> {
        if self.version > SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

/// Compact binary encoding used by the memory and SQLite backends.
pub fn encode(snapshot: &PlayerSnapshot) -> Result<Vec<u8>> {
    Ok(bincode::serialize(snapshot)?)
}

pub fn decode(bytes: &[u8]) -> Result<PlayerSnapshot> {
    let snapshot: PlayerSnapshot = bincode::deserialize(bytes)?;
    snapshot.check_version()?;
    Ok(snapshot)
}

pub(crate) fn from_json(text: &str) -> Result<PlayerSnapshot> {
    let snapshot: PlayerSnapshot = serde_json::from_str(text)?;
    snapshot.check_version()?;
    Ok(snapshot)
}
