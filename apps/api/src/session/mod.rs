//! Per-visitor session persistence.
//!
//! The session document (`SessionData`) is keyed by a random UUID carried in the
//! `flightmate_session` cookie. Storage sits behind `SessionStore` so the
//! backend is a startup choice:
//! - `memory`: in-process map, lost on restart
//! - `file`: one JSON file per session under `SESSION_DIR`
//! - `redis`: `SET EX` per session, shared across instances

pub mod file;
pub mod memory;
pub mod middleware;
pub mod redis_store;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::models::session::SessionData;

pub use middleware::{session_layer, Session};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` for unknown or expired sessions.
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>, SessionError>;

    async fn save(&self, id: Uuid, data: &SessionData) -> Result<(), SessionError>;

    async fn remove(&self, id: Uuid) -> Result<(), SessionError>;

    fn backend(&self) -> &'static str;
}

/// Session document plus its last write time, as the memory and file stores keep it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub data: SessionData,
    pub updated_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(data: SessionData) -> Self {
        Self {
            data,
            updated_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.updated_at > ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    File,
    Redis,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "file" | "filesystem" => Ok(SessionBackend::File),
            "redis" => Ok(SessionBackend::Redis),
            other => Err(format!(
                "unknown session backend '{other}' (expected memory|file|redis)"
            )),
        }
    }
}

impl fmt::Display for SessionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionBackend::Memory => f.write_str("memory"),
            SessionBackend::File => f.write_str("file"),
            SessionBackend::Redis => f.write_str("redis"),
        }
    }
}

/// Builds the configured store. Failing to open it is fatal at startup.
pub async fn build_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    let ttl = Duration::minutes(config.session_ttl_minutes);

    let store: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Memory => Arc::new(memory::MemorySessionStore::new(ttl)),
        SessionBackend::File => Arc::new(
            file::FileSessionStore::open(&config.session_dir, ttl, config.session_clear_on_start)
                .await
                .with_context(|| {
                    format!(
                        "failed to open session directory {}",
                        config.session_dir.display()
                    )
                })?,
        ),
        SessionBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL must be set when SESSION_BACKEND=redis")?;
            Arc::new(
                redis_store::RedisSessionStore::connect(url, ttl)
                    .await
                    .context("failed to connect to Redis session store")?,
            )
        }
    };

    info!(
        "Session store initialized (backend: {}, ttl: {}m)",
        store.backend(),
        config.session_ttl_minutes
    );
    Ok(store)
}
