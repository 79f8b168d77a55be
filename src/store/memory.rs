//! In-memory session store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStore, StoreError};
use crate::coordination::{CoordinationSession, SessionId};

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, CoordinationSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn save(&self, session: &CoordinationSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        Ok(())
    }

    async fn get(&self, id: SessionId) -> Result<Option<CoordinationSession>, StoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<CoordinationSession>, StoreError> {
        let mut sessions: Vec<CoordinationSession> =
            self.sessions.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        sessions.truncate(limit);
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_contract() {
        let store = InMemorySessionStore::new();
        assert!(!store.is_persistent());
        crate::store::tests::exercise_store(&store).await;
    }
}
