//! Home, onboarding and reset.

use axum::{extract::State, response::Redirect, Extension, Form, Json};
use serde::Serialize;
use tracing::{debug, info};

use crate::models::profile::{Profile, ProfileSubmission};
use crate::routes::views::ProfileOptions;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub profile: Profile,
    pub display_name: String,
    pub has_profile: bool,
    pub liked_count: usize,
    pub recent_count: usize,
    pub catalog_size: usize,
}

#[derive(Debug, Serialize)]
pub struct OnboardingView {
    pub profile: Profile,
    pub options: ProfileOptions,
}

/// GET /
pub async fn handle_home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<HomeView> {
    let (profile, liked_count, recent_count) = session
        .read(|data| (data.profile.clone(), data.likes.len(), data.recent.len()))
        .await;

    Json(HomeView {
        display_name: profile.display_name(),
        has_profile: !profile.is_empty(),
        profile,
        liked_count,
        recent_count,
        catalog_size: state.catalog.len(),
    })
}

/// GET /onboarding
pub async fn handle_get_onboarding(Extension(session): Extension<Session>) -> Json<OnboardingView> {
    let profile = session.read(|data| data.profile.clone()).await;
    Json(OnboardingView {
        profile,
        options: ProfileOptions::all(),
    })
}

/// POST /onboarding
///
/// Replaces the whole profile; fields left blank end up unset.
pub async fn handle_save_onboarding(
    Extension(session): Extension<Session>,
    form: Option<Form<ProfileSubmission>>,
) -> Redirect {
    let Some(Form(submission)) = form else {
        debug!("Onboarding form could not be parsed; sending visitor back");
        return Redirect::to("/onboarding");
    };

    let profile = Profile::from(submission);
    debug!(
        "Saving profile for session {} (scoring attributes: {})",
        session.id(),
        profile.has_scoring_attributes()
    );
    session.update(|data| data.profile = profile).await;

    Redirect::to("/")
}

/// POST /reset
pub async fn handle_reset(Extension(session): Extension<Session>) -> Redirect {
    session.clear().await;
    info!("Session {} reset by visitor", session.id());
    Redirect::to("/")
}
