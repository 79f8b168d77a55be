//! JSON file-based session store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{sanitize_filename, SessionStore, StoreError};
use crate::coordination::{CoordinationSession, SessionId};

#[derive(Debug, Serialize, Deserialize, Default)]
struct SessionSnapshot {
    sessions: HashMap<Uuid, CoordinationSession>,
}

#[derive(Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    sessions: Arc<RwLock<HashMap<Uuid, CoordinationSession>>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileSessionStore {
    pub async fn new(base_dir: PathBuf, operator: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir).await?;
        let path = base_dir.join(format!("sessions-{}.json", sanitize_filename(operator)));
        let snapshot = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<SessionSnapshot>(&bytes) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Failed to parse session store {}: {}", path.display(), e);
                    SessionSnapshot::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SessionSnapshot::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            sessions: Arc::new(RwLock::new(snapshot.sessions)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = SessionSnapshot {
            sessions: self.sessions.read().await.clone(),
        };
        let data = serde_json::to_vec_pretty(&snapshot)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn save(&self, session: &CoordinationSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id().as_uuid(), session.clone());
        self.persist().await
    }

    async fn get(&self, id: SessionId) -> Result<Option<CoordinationSession>, StoreError> {
        Ok(self.sessions.read().await.get(&id.as_uuid()).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<CoordinationSession>, StoreError> {
        let mut sessions: Vec<CoordinationSession> =
            self.sessions.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        sessions.truncate(limit);
        Ok(sessions)
    }
}
