use async_trait::async_trait;
use chrono::Duration;
use redis::aio::MultiplexedConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::session::SessionData;
use crate::session::{SessionError, SessionStore};

const KEY_PREFIX: &str = "flightmate:session:";

/// Sessions as JSON strings with a Redis-side expiry.
pub struct RedisSessionStore {
    connection: MultiplexedConnection,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, SessionError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Redis session store connected");

        Ok(Self {
            connection,
            ttl_seconds: ttl.num_seconds().max(1) as u64,
        })
    }

    fn key(id: Uuid) -> String {
        format!("{KEY_PREFIX}{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>, SessionError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(id))
            .query_async(&mut connection)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!("Discarding unreadable session {id}: {e}");
                self.remove(id).await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, id: Uuid, data: &SessionData) -> Result<(), SessionError> {
        let mut connection = self.connection.clone();
        let body = serde_json::to_string(data)?;
        let _: () = redis::cmd("SET")
            .arg(Self::key(id))
            .arg(body)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("DEL")
            .arg(Self::key(id))
            .query_async(&mut connection)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
