use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::session::SessionData;
use crate::session::{SessionError, SessionStore, StoredSession};

/// One `<uuid>.json` file per session.
pub struct FileSessionStore {
    dir: PathBuf,
    ttl: Duration,
}

impl FileSessionStore {
    /// Creates the directory. With `clear_on_start`, sessions left over from a
    /// previous run are wiped first.
    pub async fn open(dir: &Path, ttl: Duration, clear_on_start: bool) -> Result<Self, SessionError> {
        if clear_on_start {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => info!("Cleared old sessions in {}", dir.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tokio::fs::create_dir_all(dir).await?;

        Ok(Self {
            dir: dir.to_path_buf(),
            ttl,
        })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Deletes session files not written within the TTL, except `keep`.
    /// Ages come from file mtimes, which track `updated_at` since every write
    /// goes through `save`.
    async fn sweep_expired(&self, keep: Uuid) -> Result<usize, SessionError> {
        let ttl = self.ttl.to_std().unwrap_or_default();
        let keep_name = format!("{keep}.json");
        let mut swept = 0;

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json")
                || entry.file_name().to_str() == Some(keep_name.as_str())
            {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let expired = modified
                .elapsed()
                .map(|age| age > ttl)
                .unwrap_or(false);
            if expired {
                self.discard(&path).await?;
                swept += 1;
            }
        }

        if swept > 0 {
            debug!("Swept {swept} expired session files from {}", self.dir.display());
        }
        Ok(swept)
    }

    async fn discard(&self, path: &Path) -> Result<(), SessionError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>, SessionError> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if stored.is_expired(self.ttl) => {
                self.discard(&path).await?;
                Ok(None)
            }
            Ok(stored) => Ok(Some(stored.data)),
            Err(e) => {
                warn!("Discarding unreadable session file {}: {e}", path.display());
                self.discard(&path).await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, id: Uuid, data: &SessionData) -> Result<(), SessionError> {
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec(&StoredSession::new(data.clone()))?;

        // Write-then-rename so readers never see a half-written document
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        self.sweep_expired(id).await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.discard(&self.path_for(id)).await
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path(), Duration::minutes(30), false)
            .await
            .unwrap();
        let id = Uuid::new_v4();

        let mut data = SessionData::default();
        data.toggle_like(7);
        store.save(id, &data).await.unwrap();
        assert!(dir.path().join(format!("{id}.json")).exists());
        assert_eq!(store.load(id).await.unwrap(), Some(data));

        store.remove(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
        // removing twice is fine
        store.remove(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_on_start_wipes_old_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = dir.path().join("sessions");
        let id = Uuid::new_v4();

        let store = FileSessionStore::open(&sessions, Duration::minutes(30), false)
            .await
            .unwrap();
        store.save(id, &SessionData::default()).await.unwrap();

        let reopened = FileSessionStore::open(&sessions, Duration::minutes(30), true)
            .await
            .unwrap();
        assert!(reopened.load(id).await.unwrap().is_none());
        assert!(sessions.exists());
    }

    #[tokio::test]
    async fn test_save_sweeps_expired_files_of_other_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path(), Duration::zero(), false)
            .await
            .unwrap();
        for _ in 0..20 {
            store.save(Uuid::new_v4(), &SessionData::default()).await.unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let latest = Uuid::new_v4();
        store.save(latest, &SessionData::default()).await.unwrap();

        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(remaining, vec![std::ffi::OsString::from(format!("{latest}.json"))]);
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path(), Duration::minutes(30), false)
            .await
            .unwrap();
        let first = Uuid::new_v4();
        store.save(first, &SessionData::default()).await.unwrap();
        store.save(Uuid::new_v4(), &SessionData::default()).await.unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert!(store.load(first).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path(), Duration::minutes(30), false)
            .await
            .unwrap();
        let id = Uuid::new_v4();
        let path = dir.path().join(format!("{id}.json"));
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(store.load(id).await.unwrap().is_none());
        assert!(!path.exists());
    }
}
