mod catalog;
mod chat;
mod config;
mod errors;
mod matching;
mod models;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::Catalog;
use crate::chat::replies::build_reply_strategy;
use crate::config::Config;
use crate::matching::recommend::build_recommender;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a malformed variable stops startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FlightMate API v{}", env!("CARGO_PKG_VERSION"));

    // Build the passenger catalog (fatal on a bad seed file)
    let catalog = Catalog::load(&config.catalog_options()).with_context(|| {
        format!(
            "Failed to load passenger catalog from {}",
            config.catalog_path.display()
        )
    })?;
    if catalog.is_empty() {
        warn!("Passenger catalog is empty; every listing will be blank");
    }

    // Initialize session storage
    let sessions = session::build_store(&config).await?;

    // Recommendation and chat backends (swap via AI_MODE / REPLY_STRATEGY)
    let recommender = build_recommender(config.ai_mode, config.scoring_policy());
    let replies = build_reply_strategy(config.reply_strategy);
    info!(
        "Recommender: {} (threshold {}), replies: {}",
        recommender.backend(),
        config.scoring_policy().effective_threshold(),
        replies.name()
    );

    // Build app state
    let state = AppState {
        catalog: Arc::new(catalog),
        config: config.clone(),
        sessions,
        recommender,
        replies,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a real frontend host exists

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
