//! Session storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for tests and one-off runs)
//! - `file`: JSON snapshot file per operator
//! - `sqlite`: SQLite database, one row per session

mod file;
mod memory;
mod sqlite;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::coordination::{CoordinationSession, SessionId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Timestamp format used for ordering in persistent backends.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Sanitize a string for use as a filename.
pub fn sanitize_filename(value: &str) -> String {
    let out: String = value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "default".to_string()
    } else {
        out
    }
}

/// Session store trait - implemented by all storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Insert or replace the stored copy of a session.
    async fn save(&self, session: &CoordinationSession) -> Result<(), StoreError>;

    /// Get a single session by ID.
    async fn get(&self, id: SessionId) -> Result<Option<CoordinationSession>, StoreError>;

    /// List sessions, most recently updated first.
    async fn list(&self, limit: usize) -> Result<Vec<CoordinationSession>, StoreError>;
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreType {
    Memory,
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown store type '{0}' (expected memory, file or sqlite)")]
pub struct UnknownStoreType(pub String);

impl std::str::FromStr for StoreType {
    type Err = UnknownStoreType;

    /// Parse an environment variable or flag value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            "sqlite" | "db" => Ok(Self::Sqlite),
            _ => Err(UnknownStoreType(s.to_string())),
        }
    }
}

/// Create a session store based on type and configuration.
pub async fn create_session_store(
    store_type: StoreType,
    base_dir: PathBuf,
    operator: &str,
) -> Result<Arc<dyn SessionStore>, StoreError> {
    match store_type {
        StoreType::Memory => Ok(Arc::new(InMemorySessionStore::new())),
        StoreType::File => Ok(Arc::new(FileSessionStore::new(base_dir, operator).await?)),
        StoreType::Sqlite => Ok(Arc::new(SqliteSessionStore::new(base_dir, operator).await?)),
    }
}
