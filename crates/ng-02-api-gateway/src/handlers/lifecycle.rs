//! `/service/*`: supervised process control.

use crate::domain::error::{ApiError, ApiResult};
use crate::router::AppState;
use axum::extract::State;
use axum::Json;
use ng_01_supervisor::PhaseReport;
use serde_json::Value;
use tracing::{error, warn};

/// Full restart. Per-process faults are logged, not reported.
pub async fn restart(State(state): State<AppState>) -> ApiResult<&'static str> {
    let report = state.orchestrator.restart().await.map_err(|e| {
        error!(error = %e, "Restart aborted");
        state.metrics.record_lifecycle_failure(0);
        ApiError::from(e)
    })?;
    state.metrics.record_restart();
    state
        .metrics
        .record_process_faults(report.stop.failures().count() + report.start.failures().count());
    Ok("restarted")
}

pub async fn stop(State(state): State<AppState>) -> ApiResult<&'static str> {
    let report = state.orchestrator.stop_all().await?;
    phase_result(&state, &report, "stopped")
}

pub async fn start(State(state): State<AppState>) -> ApiResult<&'static str> {
    let report = state.orchestrator.start_all().await?;
    phase_result(&state, &report, "started")
}

fn phase_result(
    state: &AppState,
    report: &PhaseReport,
    done: &'static str,
) -> ApiResult<&'static str> {
    if report.is_success() {
        return Ok(done);
    }
    let summary = report.failure_summary();
    warn!(phase = %report.phase, failures = %summary, "Lifecycle call failed");
    state
        .metrics
        .record_lifecycle_failure(report.failures().count());
    Err(ApiError::internal(summary))
}

/// `supervisor.getAllProcessInfo`, relayed unmodified.
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let info = state.supervisor.get_all_process_info().await.map_err(|e| {
        error!(error = %e, "Error getting status");
        ApiError::from(e)
    })?;
    Ok(Json(info.to_json()))
}
