//! Upstream proxy handlers.
//!
//! `/rest/*` and `/keymanager/*` reach [`forward_upstream`] through the
//! router fallback and are dispatched by the upstream table. The checkpointz
//! and block-explorer routes build a one-off `https://<endpoint>` target.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::proxy::{ProxyRequest, ProxyResponse};
use crate::domain::upstream::{AuthMode, UpstreamTarget};
use crate::middleware::RequestTimer;
use crate::router::AppState;
use axum::extract::{Path, State};
use axum::http::{Method, Uri};
use bytes::Bytes;
use std::sync::Arc;
use tracing::warn;

/// Resolve the path against the upstream table and forward.
pub async fn forward_upstream(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> ApiResult<ProxyResponse> {
    let path = uri.path();
    let Some((target, rest)) = state.upstreams.resolve(path) else {
        state.metrics.record_route_miss();
        return Err(ApiError::not_found(path));
    };
    if !target.allows(&method) {
        state.metrics.record_route_miss();
        return Err(ApiError::method_not_allowed(method.as_str(), path));
    }

    let request = ProxyRequest::new(method, rest)
        .with_query(uri.query())
        .with_body(body);
    relay(&state, target, request).await
}

/// `GET /:endpoint/checkpointz/v1/beacon/slots/:slot`
pub async fn checkpointz_slot(
    state: State<AppState>,
    Path((endpoint, slot)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> ApiResult<ProxyResponse> {
    external_get(state, method, uri, body, &endpoint, "checkpointz/v1/beacon/slots", &slot).await
}

/// `GET /:endpoint/api/v1/block/:slot`
pub async fn explorer_block(
    state: State<AppState>,
    Path((endpoint, slot)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> ApiResult<ProxyResponse> {
    external_get(state, method, uri, body, &endpoint, "api/v1/block", &slot).await
}

async fn external_get(
    state: State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
    endpoint: &str,
    resource: &str,
    slot: &str,
) -> ApiResult<ProxyResponse> {
    // `/rest/api/v1/block/1` is a beacon path that happens to fit this
    // route's shape; configured prefixes take precedence.
    if state.upstreams.resolve(uri.path()).is_some() {
        return forward_upstream(state, method, uri, body).await;
    }
    if method != Method::GET {
        return Err(ApiError::method_not_allowed(method.as_str(), uri.path()));
    }
    if !is_valid_endpoint(endpoint) {
        return Err(ApiError::bad_request(format!("invalid endpoint {:?}", endpoint)));
    }
    if !is_valid_slot(slot) {
        return Err(ApiError::bad_request(format!("invalid slot {:?}", slot)));
    }

    let target = UpstreamTarget::new("", format!("https://{}", endpoint), AuthMode::None);
    let request = ProxyRequest::new(Method::GET, format!("{}/{}", resource, slot));
    relay(&state, &target, request).await
}

async fn relay(
    state: &AppState,
    target: &UpstreamTarget,
    request: ProxyRequest,
) -> ApiResult<ProxyResponse> {
    let timer = RequestTimer::new(Arc::clone(&state.metrics));
    match state.proxy.forward(target, request).await {
        Ok(response) => {
            timer.finish(true);
            Ok(response)
        }
        Err(e) => {
            timer.finish(false);
            warn!(upstream = %target.base_url, error = %e, "Proxy request failed");
            Err(e.into())
        }
    }
}

/// Host or `host:port`; nothing that could change the URL's shape.
fn is_valid_endpoint(endpoint: &str) -> bool {
    !endpoint.is_empty()
        && endpoint
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'))
}

/// Slot number or a named block id such as `head` or `finalized`.
fn is_valid_slot(slot: &str) -> bool {
    !slot.is_empty() && slot.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_validation() {
        assert!(is_valid_endpoint("sync-mainnet.beaconcha.in"));
        assert!(is_valid_endpoint("checkpoint.example.org:8443"));
        assert!(!is_valid_endpoint(""));
        assert!(!is_valid_endpoint("evil.com@internal"));
        assert!(!is_valid_endpoint("host/path"));
        assert!(!is_valid_endpoint("host?q=1"));
    }

    #[test]
    fn test_slot_validation() {
        assert!(is_valid_slot("8123456"));
        assert!(is_valid_slot("head"));
        assert!(!is_valid_slot(""));
        assert!(!is_valid_slot("1;drop"));
    }
}
