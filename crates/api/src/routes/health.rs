//! Root-level health check.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Routes mounted at the application root.
///
/// ```text
/// GET /health -> liveness + database reachability
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match servia_db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check database probe failed");
            "unreachable"
        }
    };

    Json(json!({
        "status": "ok",
        "database": database,
    }))
}
