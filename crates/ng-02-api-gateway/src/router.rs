//! Route table and shared handler state.

use crate::adapters::{DefaultSettingsCatalog, ReverseProxy};
use crate::domain::config::GatewayConfig;
use crate::domain::upstream::UpstreamTable;
use crate::handlers::{info, lifecycle, proxy, settings};
use crate::middleware::{create_cors_layer, GatewayMetrics};
use crate::ports::SettingsStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get, post};
use axum::Router;
use ng_01_supervisor::{RestartOrchestrator, SupervisorApi};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers. Everything is read-only or
/// internally synchronized.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstreams: Arc<UpstreamTable>,
    pub proxy: Arc<ReverseProxy>,
    pub supervisor: Arc<dyn SupervisorApi>,
    pub orchestrator: Arc<RestartOrchestrator>,
    pub settings: Arc<dyn SettingsStore>,
    pub defaults: Arc<DefaultSettingsCatalog>,
    pub metrics: Arc<GatewayMetrics>,
}

/// Build the gateway router.
///
/// Proxied prefixes are not registered as routes; the fallback resolves them
/// so that 404 and 405 answers carry a JSON `error` body.
pub fn build_router(state: AppState) -> Router {
    // Request → Trace → CORS → BodyLimit → Handler
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&state.config.cors))
        .layer(DefaultBodyLimit::max(state.config.http.max_body_size));

    Router::new()
        .route("/ping", get(info::ping))
        .route("/network", get(info::network))
        .route("/name", get(info::name))
        .route("/metrics", get(info::metrics))
        .route(
            "/settings",
            get(settings::get_settings).post(settings::save_settings),
        )
        .route("/defaultsettings", get(settings::default_settings))
        .route("/service/restart", post(lifecycle::restart))
        .route("/service/stop", post(lifecycle::stop))
        .route("/service/start", post(lifecycle::start))
        .route("/service/status", get(lifecycle::status))
        .route(
            "/:endpoint/checkpointz/v1/beacon/slots/:slot",
            any(proxy::checkpointz_slot),
        )
        .route("/:endpoint/api/v1/block/:slot", any(proxy::explorer_block))
        .fallback(proxy::forward_upstream)
        .layer(middleware)
        .with_state(state)
}
