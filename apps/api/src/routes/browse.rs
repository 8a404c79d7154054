//! Browsing views: music, interests, purpose, and the passenger detail page.

use axum::{
    extract::{Path, State},
    response::Redirect,
    Extension, Form, Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::thread_len;
use crate::errors::AppError;
use crate::matching::filters::{
    apply_policy, filter_interest, filter_interest_exact, filter_music, filter_purpose,
};
use crate::models::passenger::{
    canonical_genre, canonical_purpose, InterestCategory, PassengerRecord, GENRES, PURPOSES,
};
use crate::models::session::InterestSelection;
use crate::routes::views::{cards, interest_options, InterestOptions, PassengerCard};
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListingView {
    pub options: &'static [&'static str],
    pub selected: Option<String>,
    pub policy: String,
    /// `None` until a value is selected.
    pub passengers: Option<Vec<PassengerCard>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InterestForm {
    pub interest: Option<String>,
    pub exact: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InterestsView {
    pub selected: Option<String>,
    pub exact: bool,
    /// Values the visitor's own profile holds; the only choices in exact mode.
    pub profile_interests: Vec<String>,
    pub options: Vec<InterestOptions>,
    pub policy: String,
    pub passengers: Option<Vec<PassengerCard>>,
}

#[derive(Debug, Serialize)]
pub struct PersonView {
    pub person: PassengerRecord,
    pub liked: bool,
    pub chat_messages: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Music
// ────────────────────────────────────────────────────────────────────────────

/// GET /music
pub async fn handle_music(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<ListingView> {
    let (selected, likes) = session
        .read(|data| (data.filter_music.clone(), data.likes.clone()))
        .await;

    let policy = state.config.music_results;
    let passengers = selected.as_deref().map(|genre| {
        let mut rng = StdRng::from_entropy();
        let listed = apply_policy(&state.catalog, filter_music(&state.catalog, genre), policy, &mut rng);
        cards(&listed, &likes)
    });

    Json(ListingView {
        options: GENRES,
        selected,
        policy: policy.to_string(),
        passengers,
    })
}

/// GET /music/set/:genre
pub async fn handle_set_music(
    Extension(session): Extension<Session>,
    Path(genre): Path<String>,
) -> Redirect {
    match canonical_genre(&genre) {
        Some(genre) => {
            session
                .update(|data| data.filter_music = Some(genre.to_string()))
                .await
        }
        None => debug!("Ignoring unknown genre '{genre}'"),
    }
    Redirect::to("/music")
}

// ────────────────────────────────────────────────────────────────────────────
// Purpose
// ────────────────────────────────────────────────────────────────────────────

/// GET /purpose
pub async fn handle_purpose(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<ListingView> {
    let (selected, likes) = session
        .read(|data| (data.filter_purpose.clone(), data.likes.clone()))
        .await;

    let policy = state.config.purpose_results;
    let passengers = selected.as_deref().map(|purpose| {
        let mut rng = StdRng::from_entropy();
        let listed = apply_policy(
            &state.catalog,
            filter_purpose(&state.catalog, purpose),
            policy,
            &mut rng,
        );
        cards(&listed, &likes)
    });

    Json(ListingView {
        options: PURPOSES,
        selected,
        policy: policy.to_string(),
        passengers,
    })
}

/// GET /purpose/set/:reason
pub async fn handle_set_purpose(
    Extension(session): Extension<Session>,
    Path(reason): Path<String>,
) -> Redirect {
    match canonical_purpose(&reason) {
        Some(reason) => {
            session
                .update(|data| data.filter_purpose = Some(reason.to_string()))
                .await
        }
        None => debug!("Ignoring unknown purpose '{reason}'"),
    }
    Redirect::to("/purpose")
}

// ────────────────────────────────────────────────────────────────────────────
// Interests
// ────────────────────────────────────────────────────────────────────────────

/// Canonical spelling of a category name or detail value.
fn canonical_interest(value: &str) -> Option<&'static str> {
    match value.parse::<InterestCategory>() {
        Ok(category) => Some(category.as_str()),
        Err(_) => InterestCategory::owning(value).map(|(_, v)| v),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

async fn interests_view(state: &AppState, session: &Session) -> InterestsView {
    let (selection, profile, likes) = session
        .read(|data| {
            (
                data.interest_selection(),
                data.profile.clone(),
                data.likes.clone(),
            )
        })
        .await;

    let policy = state.config.interest_results;
    let mut rng = StdRng::from_entropy();
    let (selected, exact, passengers) = match &selection {
        Some(InterestSelection::Any(value)) => {
            let listed = apply_policy(
                &state.catalog,
                filter_interest(&state.catalog, value),
                policy,
                &mut rng,
            );
            (Some(value.clone()), false, Some(cards(&listed, &likes)))
        }
        Some(InterestSelection::Exact(value)) => {
            // Exact mode lists genuine matches only; padding would defeat it.
            let listed = filter_interest_exact(&state.catalog, &profile, value);
            (Some(value.clone()), true, Some(cards(&listed, &likes)))
        }
        None => (None, false, None),
    };

    InterestsView {
        selected,
        exact,
        profile_interests: profile.interests.values().map(str::to_string).collect(),
        options: interest_options(),
        policy: policy.to_string(),
        passengers,
    }
}

/// GET /interests
pub async fn handle_interests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<InterestsView> {
    Json(interests_view(&state, &session).await)
}

/// POST /interests
///
/// Sets the interest selection and returns the refreshed listing. A blank or
/// unknown value leaves the current selection untouched.
pub async fn handle_set_interest(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: Option<Form<InterestForm>>,
) -> Json<InterestsView> {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let exact = form.exact.as_deref().map(is_truthy).unwrap_or(false);
    let value = form
        .interest
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let selection = match value {
        Some(value) if exact => Some(InterestSelection::Exact(
            canonical_interest(value).unwrap_or(value).to_string(),
        )),
        Some(value) => match canonical_interest(value) {
            Some(canonical) => Some(InterestSelection::Any(canonical.to_string())),
            None => {
                debug!("Ignoring unknown interest '{value}'");
                None
            }
        },
        None => None,
    };

    if let Some(selection) = selection {
        session
            .update(|data| data.set_interest_selection(selection))
            .await;
    }

    Json(interests_view(&state, &session).await)
}

// ────────────────────────────────────────────────────────────────────────────
// Person
// ────────────────────────────────────────────────────────────────────────────

/// GET /person/:id
///
/// Read-only passenger page. Accepts a numeric id or an exact name.
pub async fn handle_person(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<Json<PersonView>, AppError> {
    let person = state
        .catalog
        .find(&key)
        .ok_or_else(|| AppError::NotFound(format!("passenger '{key}'")))?;

    let (liked, chat_messages) = session
        .read(|data| (data.is_liked(person.id), thread_len(&data.chats, person.id)))
        .await;

    Ok(Json(PersonView {
        person: person.clone(),
        liked,
        chat_messages,
    }))
}
