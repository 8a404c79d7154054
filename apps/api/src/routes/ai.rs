use axum::{extract::State, Extension, Json};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::matching::recommend::{Recommendation, RecommendationRequest};
use crate::models::profile::Profile;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AiView {
    pub backend: &'static str,
    pub threshold: u32,
    pub profile: Profile,
    pub recommendations: Vec<Recommendation>,
}

/// GET /ai
///
/// Ranks the catalog against the visitor's profile. The names shown are
/// remembered so the rotating backend can avoid repeating them next time.
pub async fn handle_ai(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<AiView> {
    let (profile, last_seen) = session
        .read(|data| (data.profile.clone(), data.last_ai_names.clone()))
        .await;

    let mut rng = StdRng::from_entropy();
    let request = RecommendationRequest {
        profile: &profile,
        last_seen: &last_seen,
    };
    let recommendations = state
        .recommender
        .recommend(&request, &state.catalog, &mut rng);

    debug!(
        "{} backend produced {} recommendations for session {}",
        state.recommender.backend(),
        recommendations.len(),
        session.id()
    );

    let shown: Vec<String> = recommendations
        .iter()
        .map(|r| r.passenger.name.clone())
        .collect();
    session.update(|data| data.last_ai_names = shown).await;

    Json(AiView {
        backend: state.recommender.backend(),
        threshold: state.config.scoring_policy().effective_threshold(),
        profile,
        recommendations,
    })
}
