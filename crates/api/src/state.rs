use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::suggestion::SuggestionClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: questboard_db::DbPool,
    /// Server configuration (JWT secrets, timeouts, CORS origins).
    pub config: Arc<ServerConfig>,
    /// LLM skill-suggestion client; `None` when not configured, which
    /// surfaces as a typed 503 instead of a scattered null check.
    pub suggestions: Option<Arc<SuggestionClient>>,
}
