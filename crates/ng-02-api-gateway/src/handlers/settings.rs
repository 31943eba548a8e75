//! Settings document endpoints.
//!
//! Saving settings restarts the supervised processes so they pick up the new
//! values. Any failure on that path answers 422.

use crate::domain::error::{ApiError, ApiResult};
use crate::router::AppState;
use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use serde_json::Value;
use tracing::{error, info, warn};

/// Stored settings, or the network defaults when they cannot be read.
pub async fn get_settings(State(state): State<AppState>) -> Json<Value> {
    match state.settings.load().await {
        Ok(settings) => Json(settings),
        Err(e) => {
            warn!(error = %e, "Settings unavailable, serving defaults");
            Json(state.defaults.defaults_for(&state.config.node.network).await)
        }
    }
}

pub async fn save_settings(State(state): State<AppState>, body: Bytes) -> ApiResult<&'static str> {
    let result = save_and_restart(&state, &body).await;
    state.metrics.record_settings_save(result.is_ok());
    result.map(|()| "Saved settings and restarted")
}

async fn save_and_restart(state: &AppState, body: &[u8]) -> ApiResult<()> {
    let settings: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected settings: invalid JSON");
        ApiError::unprocessable(format!("invalid settings JSON: {}", e))
    })?;

    state.settings.save(&settings).await.map_err(|e| {
        error!(error = %e, "Could not write settings file");
        ApiError::unprocessable(e.to_string())
    })?;
    info!("Settings saved, restarting services");

    let report = state.orchestrator.restart().await.map_err(|e| {
        error!(error = %e, "Restart after settings save failed");
        ApiError::unprocessable(e.to_string())
    })?;
    state.metrics.record_restart();
    state
        .metrics
        .record_process_faults(report.stop.failures().count() + report.start.failures().count());
    Ok(())
}

pub async fn default_settings(State(state): State<AppState>) -> Json<Value> {
    Json(state.defaults.defaults_for(&state.config.node.network).await)
}
