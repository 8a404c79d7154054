//! Chat, likes and the recently-viewed list.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Extension, Form, Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chat::{self, ChatMessage, SendOutcome, ThreadState};
use crate::errors::AppError;
use crate::models::passenger::PassengerRecord;
use crate::models::session::LikeAction;
use crate::routes::views::{cards, PassengerCard};
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ChatQuery {
    /// Any value other than "0"/"false" starts the thread over.
    pub new: Option<String>,
}

impl ChatQuery {
    fn is_fresh(&self) -> bool {
        match self.new.as_deref().map(str::trim) {
            None => false,
            Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatView {
    pub passenger: PassengerRecord,
    pub state: ThreadState,
    pub reply_strategy: &'static str,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub id: u32,
    pub action: LikeAction,
    pub liked_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RecentView {
    pub passengers: Vec<PassengerCard>,
}

/// Resolves a path key (numeric id or exact name). Anything unresolvable,
/// including ids that do not fit a `u32`, becomes a not-found redirect.
fn find_passenger<'a>(state: &'a AppState, key: &str) -> Result<&'a PassengerRecord, AppError> {
    state
        .catalog
        .find(key)
        .ok_or_else(|| AppError::NotFound(format!("passenger '{key}'")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /connect/:id (also /chat/:id)
///
/// Opening a chat counts as viewing the passenger.
pub async fn handle_open_chat(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ChatView>, AppError> {
    let passenger = find_passenger(&state, &key)?;
    let id = passenger.id;
    let fresh = query.is_fresh();

    let messages = session
        .update(|data| {
            data.record_recent(id);
            chat::open_thread(&mut data.chats, id, fresh)
        })
        .await;

    if fresh {
        debug!("Session {} started a fresh chat with passenger {id}", session.id());
    }

    Ok(Json(ChatView {
        passenger: passenger.clone(),
        state: ThreadState::of(&messages),
        reply_strategy: state.replies.name(),
        messages,
    }))
}

/// POST /connect/:id (also /chat/:id and the legacy /send_message/:id)
pub async fn handle_send_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
    form: Option<Form<MessageForm>>,
) -> Result<Redirect, AppError> {
    let passenger = find_passenger(&state, &key)?;
    let id = passenger.id;
    let back = Redirect::to(&format!("/connect/{id}"));

    let text = form
        .and_then(|Form(form)| form.message)
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Ok(back);
    }

    let mut rng = StdRng::from_entropy();
    let outcome = session
        .update(|data| {
            chat::send_message(
                &mut data.chats,
                passenger,
                &text,
                state.replies.as_ref(),
                &mut rng,
            )
        })
        .await;

    if outcome == SendOutcome::Sent {
        debug!("Session {} messaged passenger {id}", session.id());
    }

    Ok(back)
}

/// POST /like/:id
pub async fn handle_like(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let id = find_passenger(&state, &key)?.id;

    let (action, liked_count) = session
        .update(|data| {
            let action = data.toggle_like(id);
            (action, data.likes.len())
        })
        .await;

    info!("Session {} like {id}: {action:?}", session.id());

    Ok(Json(LikeResponse {
        id,
        action,
        liked_count,
    }))
}

/// GET /recent
///
/// Most recently viewed first. Ids that no longer resolve are skipped.
pub async fn handle_recent(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<RecentView> {
    let (recent, likes) = session
        .read(|data| (data.recent.clone(), data.likes.clone()))
        .await;

    let passengers: Vec<&PassengerRecord> = recent
        .iter()
        .filter_map(|id| state.catalog.get(*id))
        .collect();

    Json(RecentView {
        passengers: cards(&passengers, &likes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_query_freshness() {
        let query = |v: Option<&str>| ChatQuery {
            new: v.map(str::to_string),
        };
        assert!(!query(None).is_fresh());
        assert!(query(Some("1")).is_fresh());
        assert!(query(Some("")).is_fresh());
        assert!(!query(Some("false")).is_fresh());
        assert!(!query(Some("0")).is_fresh());
    }
}
