//! Liveness and identity endpoints.

use crate::router::AppState;
use axum::extract::State;
use axum::Json;

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn network(State(state): State<AppState>) -> String {
    state.config.node.network.clone()
}

pub async fn name(State(state): State<AppState>) -> String {
    state.config.node.name.clone()
}

pub async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.metrics.to_json())
}
