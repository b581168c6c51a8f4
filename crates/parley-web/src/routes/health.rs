//! Liveness and readiness endpoints

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "parley-web"
    }))
}

/// Ready once the upstream accepts connections.
async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let upstream = state.upstream.url();
    if state.upstream.is_reachable().await {
        (
            StatusCode::OK,
            Json(json!({ "status": "ready", "upstream": upstream })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "upstream_unreachable", "upstream": upstream })),
        )
    }
}
