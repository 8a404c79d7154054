use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::session::SessionData;
use crate::session::{SessionError, SessionStore, StoredSession};

/// In-process store. Expired entries are pruned on every write.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&id)
            .filter(|stored| !stored.is_expired(self.ttl))
            .map(|stored| stored.data.clone()))
    }

    async fn save(&self, id: Uuid, data: &SessionData) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, stored| !stored.is_expired(self.ttl));
        sessions.insert(id, StoredSession::new(data.clone()));
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_remove() {
        let store = MemorySessionStore::new(Duration::minutes(30));
        let id = Uuid::new_v4();
        assert!(store.load(id).await.unwrap().is_none());

        let mut data = SessionData::default();
        data.filter_music = Some("Jazz".to_string());
        store.save(id, &data).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), Some(data));

        store.remove(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_not_returned() {
        let store = MemorySessionStore::new(Duration::zero());
        let id = Uuid::new_v4();
        store.save(id, &SessionData::default()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(store.load(id).await.unwrap().is_none());
    }
}
