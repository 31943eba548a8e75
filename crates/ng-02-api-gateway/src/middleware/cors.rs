//! CORS layer built from the gateway configuration.
//!
//! Wrapper around tower-http CORS; the node's web UI is served from another
//! origin and calls the gateway directly.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Methods the gateway answers, plus preflight.
const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

/// Create CORS layer from gateway config
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        // No CORS headers: cross-origin callers are refused by the browser.
        return CorsLayer::new();
    }

    let mut cors = CorsLayer::new();

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors.allow_methods(ALLOWED_METHODS.to_vec())
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age))
}
