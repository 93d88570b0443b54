//! Repository contract for saving and loading a player.

use crate::snapshot::{decode, encode, from_json};
use crate::{PlayerSnapshot, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Save slot for one player snapshot.
///
/// Failures are returned to the caller as-is; implementations do not retry.
pub trait PlayerRepository: Send + Sync {
    /// Persist a snapshot, replacing any previous one.
    fn save(&self, snapshot: &PlayerSnapshot) -> Result<()>;

    /// Load the last saved snapshot, `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<PlayerSnapshot>>;
}

/// Keeps the encoded snapshot in memory. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerRepository for MemoryRepository {
    fn save(&self, snapshot: &PlayerSnapshot) -> Result<()> {
        let bytes = encode(snapshot)?;
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Result<Option<PlayerSnapshot>> {
        let slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        slot.as_deref().map(decode).transpose()
    }
}

/// Stores the snapshot as pretty JSON at a fixed path.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated save behind.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl PlayerRepository for JsonFileRepository {
    fn save(&self, snapshot: &PlayerSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.temp_path();
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }

    fn load(&self) -> Result<Option<PlayerSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        from_json(&text).map(Some)
    }
}
