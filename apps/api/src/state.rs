use std::sync::Arc;

use crate::catalog::Catalog;
use crate::chat::replies::ReplyStrategy;
use crate::config::Config;
use crate::matching::recommend::Recommender;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup, read-only afterwards.
    pub catalog: Arc<Catalog>,
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    /// Pluggable `/ai` backend. Default: ScoredRecommender. Swap via AI_MODE.
    pub recommender: Arc<dyn Recommender>,
    /// Chat reply backend. Default: KeywordReplies. Swap via REPLY_STRATEGY.
    pub replies: Arc<dyn ReplyStrategy>,
}
