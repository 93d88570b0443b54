#![deny(warnings)]

//! Persistence layer: player snapshots, the save/load repository contract
//! and its file, memory and SQLite backends.

mod repository;
mod snapshot;
mod sqlite;

pub use repository::{JsonFileRepository, MemoryRepository, PlayerRepository};
pub use snapshot::{decode, encode, PlayerSnapshot, SkillLevel, SNAPSHOT_VERSION};
pub use sqlite::{create_save, default_sqlite_url, init_db, read_snapshot, write_snapshot};

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("unsupported snapshot version {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

impl From<PersistenceError> for idle_core::EconError {
    fn from(e: PersistenceError) -> Self {
        idle_core::EconError::PersistenceFailure(e.to_string())
    }
}
