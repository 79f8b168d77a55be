//! SQLite-based session store.
//!
//! The full session is stored as JSON in `body`; the other columns exist for
//! listing and ad-hoc queries.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::{sanitize_filename, timestamp, SessionStore, StoreError};
use crate::coordination::{CoordinationSession, SessionId};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY NOT NULL,
    status TEXT NOT NULL,
    stage TEXT NOT NULL,
    candidate TEXT NOT NULL,
    position TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    body TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_updated_at ON sessions(updated_at DESC);
CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);
"#;

pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    pub async fn new(base_dir: PathBuf, operator: &str) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&base_dir).await?;
        let db_path = base_dir.join(format!("sessions-{}.db", sanitize_filename(operator)));

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn save(&self, session: &CoordinationSession) -> Result<(), StoreError> {
        let body = serde_json::to_string(session)?;
        let id = session.id().to_string();
        let status = session.status().to_string();
        let stage = session.stage().to_string();
        let candidate = session.setup().candidate.name.clone();
        let position = session.setup().position.clone();
        let created_at = timestamp(session.created_at());
        let updated_at = timestamp(session.updated_at());

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO sessions (id, status, stage, candidate, position, created_at, updated_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    status = excluded.status,
                    stage = excluded.stage,
                    updated_at = excluded.updated_at,
                    body = excluded.body",
                params![id, status, stage, candidate, position, created_at, updated_at, body],
            )?;
            Ok::<_, StoreError>(())
        })
        .await?
    }

    async fn get(&self, id: SessionId) -> Result<Option<CoordinationSession>, StoreError> {
        let conn = self.conn.clone();
        let body: Option<String> = tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let body = conn
                .query_row(
                    "SELECT body FROM sessions WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok::<_, StoreError>(body)
        })
        .await??;

        body.map(|b| serde_json::from_str(&b).map_err(StoreError::from))
            .transpose()
    }

    async fn list(&self, limit: usize) -> Result<Vec<CoordinationSession>, StoreError> {
        let conn = self.conn.clone();
        let bodies: Vec<String> = tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt =
                conn.prepare("SELECT body FROM sessions ORDER BY updated_at DESC LIMIT ?1")?;
            let rows = stmt
                .query_map(params![limit as i64], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok::<_, StoreError>(rows)
        })
        .await??;

        let mut sessions = Vec::with_capacity(bodies.len());
        for body in bodies {
            match serde_json::from_str(&body) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Skipping unreadable session row: {}", e),
            }
        }
        Ok(sessions)
    }
}
