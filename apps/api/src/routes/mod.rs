pub mod ai;
pub mod browse;
pub mod health;
pub mod profile;
pub mod social;
pub mod views;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::session::session_layer;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile
        .route("/", get(profile::handle_home))
        .route(
            "/onboarding",
            get(profile::handle_get_onboarding).post(profile::handle_save_onboarding),
        )
        .route("/reset", post(profile::handle_reset))
        // Browsing
        .route("/music", get(browse::handle_music))
        .route("/music/set/:genre", get(browse::handle_set_music))
        .route(
            "/interests",
            get(browse::handle_interests).post(browse::handle_set_interest),
        )
        .route("/purpose", get(browse::handle_purpose))
        .route("/purpose/set/:reason", get(browse::handle_set_purpose))
        .route("/person/:id", get(browse::handle_person))
        // Chat, likes, recent
        .route(
            "/connect/:id",
            get(social::handle_open_chat).post(social::handle_send_message),
        )
        .route(
            "/chat/:id",
            get(social::handle_open_chat).post(social::handle_send_message),
        )
        .route("/send_message/:id", post(social::handle_send_message))
        .route("/like/:id", post(social::handle_like))
        .route("/recent", get(social::handle_recent))
        // Recommendations
        .route("/ai", get(ai::handle_ai))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .with_state(state)
}
