use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::SharedState;

/// Build the main application router with all routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/recommend", post(api::recommend))
        .route("/api/analyze", post(api::analyze))
        .route("/api/calories", post(api::calories))
        .route("/api/recipes", post(api::recipes))
        .route("/api/shopping-list", post(api::shopping_list))
        .route("/api/history", get(api::history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn status(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> axum::Json<serde_json::Value> {
    let history_count = state.history.count().unwrap_or(0);
    axum::Json(serde_json::json!({
        "status": "running",
        "provider": state.provider.provider_id(),
        "features": state.config.features,
        "history_count": history_count,
    }))
}
