use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::SessionData;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "flightmate_session";

struct SessionSlot {
    data: SessionData,
    dirty: bool,
    cleared: bool,
}

/// Request-scoped handle to the visitor's session, installed by `session_layer`.
///
/// Handlers read through `read` and write through `update`. A new session is
/// persisted only if written; a known one is written back on every request.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    slot: Arc<Mutex<SessionSlot>>,
}

impl Session {
    fn new(id: Uuid, data: SessionData) -> Self {
        Self {
            id,
            slot: Arc::new(Mutex::new(SessionSlot {
                data,
                dirty: false,
                cleared: false,
            })),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn read<R>(&self, f: impl FnOnce(&SessionData) -> R) -> R {
        let slot = self.slot.lock().await;
        f(&slot.data)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut slot = self.slot.lock().await;
        slot.dirty = true;
        f(&mut slot.data)
    }

    /// Drops every key. The stored document is deleted and the cookie expired.
    pub async fn clear(&self) {
        let mut slot = self.slot.lock().await;
        slot.data = SessionData::default();
        slot.cleared = true;
        slot.dirty = false;
    }
}

/// Parses the session id out of the `Cookie` header(s).
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(value: &str, max_age: Option<i64>) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(seconds) = max_age {
        cookie.push_str(&format!("; Max-Age={seconds}"));
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid session cookie: {e}")))
}

/// Loads the session before the handler runs and persists it afterwards.
///
/// A brand-new session is only stored (and its cookie only set) once a
/// handler writes to it.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let known = match session_id_from_headers(request.headers()) {
        Some(id) => state.sessions.load(id).await?.map(|data| (id, data)),
        None => None,
    };
    let is_new = known.is_none();
    let (id, data) = known.unwrap_or_else(|| (Uuid::new_v4(), SessionData::default()));

    let session = Session::new(id, data);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let slot = session.slot.lock().await;
    if slot.cleared {
        state.sessions.remove(id).await?;
        debug!("Session {id} cleared");
        if !is_new {
            response
                .headers_mut()
                .append(header::SET_COOKIE, session_cookie("", Some(0))?);
        }
    } else if slot.dirty || !is_new {
        // Known sessions are written back on every request so the TTL counts
        // from the last visit, not the last change.
        state.sessions.save(id, &slot.data).await?;
        if is_new {
            response
                .headers_mut()
                .append(header::SET_COOKIE, session_cookie(&id.to_string(), None)?);
        }
    }

    Ok(response)
}
