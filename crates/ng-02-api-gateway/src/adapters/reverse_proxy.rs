//! JSON reverse proxy towards the node's upstream APIs.

use crate::domain::error::ProxyError;
use crate::domain::proxy::{ProxyRequest, ProxyResponse};
use crate::domain::upstream::{AuthMode, UpstreamTarget};
use crate::ports::TokenProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Forwards one request per call. Holds no per-request state, so a single
/// instance is shared by every handler.
#[derive(Clone)]
pub struct ReverseProxy {
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl ReverseProxy {
    /// Every outbound call is bounded by `timeout`.
    pub fn new(timeout: Duration, tokens: Arc<dyn TokenProvider>) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Transport(e.to_string()))?;
        Ok(Self { http, tokens })
    }

    pub async fn forward(
        &self,
        target: &UpstreamTarget,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, ProxyError> {
        let url = request.target_url(&target.base_url);
        let body = request.json_body()?;

        let request = match target.auth_mode {
            AuthMode::None => request,
            AuthMode::BearerFromFile => {
                let token = self.tokens.current_token().await?;
                request.with_bearer(&token)?
            }
        };

        let mut outbound = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if let Some(body) = body {
            outbound = outbound.body(body);
        }

        debug!(method = %request.method, %url, "Forwarding to upstream");
        let response = outbound.send().await.map_err(|e| {
            warn!(%url, error = %e, "Upstream unreachable");
            ProxyError::Transport(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        // Zero-length content: relay the status alone.
        if bytes.is_empty() {
            return Ok(ProxyResponse { status, body: None });
        }

        let body = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(%url, %status, error = %e, "Upstream returned non-JSON body");
            ProxyError::ResponseBody(e.to_string())
        })?;
        Ok(ProxyResponse {
            status,
            body: Some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::TokenError;
    use async_trait::async_trait;
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderMap, Method, StatusCode};
    use axum::routing::any;
    use axum::Router;
    use bytes::Bytes;
    use serde_json::json;
    use tokio::net::TcpListener;

    struct StaticToken(&'static str);

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn current_token(&self) -> Result<String, TokenError> {
            Ok(self.0.to_string())
        }
    }

    struct NoToken;

    #[async_trait]
    impl TokenProvider for NoToken {
        async fn current_token(&self) -> Result<String, TokenError> {
            Err(TokenError::Unavailable {
                path: "/data/keymanager-token".into(),
                reason: "No such file or directory".into(),
            })
        }
    }

    /// Upstream that echoes method, auth header and body back as JSON.
    async fn echo_upstream() -> String {
        let app = Router::new()
            .route(
                "/empty",
                any(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/slow",
                any(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    StatusCode::OK
                }),
            )
            .route(
                "/garbage",
                any(|| async { (StatusCode::OK, "<html>") }),
            )
            .route(
                "/*path",
                any(
                    |method: Method, headers: HeaderMap, body: Bytes| async move {
                        let auth = headers
                            .get(AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let body: Option<serde_json::Value> = serde_json::from_slice(&body).ok();
                        (
                            StatusCode::ACCEPTED,
                            axum::Json(json!({
                                "method": method.as_str(),
                                "auth": auth,
                                "body": body,
                            })),
                        )
                    },
                ),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn proxy(tokens: Arc<dyn TokenProvider>) -> ReverseProxy {
        ReverseProxy::new(Duration::from_secs(5), tokens).unwrap()
    }

    #[tokio::test]
    async fn test_bearer_attached_and_body_forwarded() {
        let base = echo_upstream().await;
        let target = UpstreamTarget::new("/keymanager", base, AuthMode::BearerFromFile);
        let request = ProxyRequest::new(Method::POST, "eth/v1/keystores")
            .with_body(Bytes::from_static(b"{\"foo\":1}"));

        let response = proxy(Arc::new(StaticToken("tok123")))
            .forward(&target, request)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert_eq!(
            response.body,
            Some(json!({ "method": "POST", "auth": "Bearer tok123", "body": { "foo": 1 } }))
        );
    }

    #[tokio::test]
    async fn test_no_auth_header_without_bearer_mode() {
        let base = echo_upstream().await;
        let target = UpstreamTarget::new("/rest", base, AuthMode::None);
        let request = ProxyRequest::new(Method::GET, "eth/v1/node/syncing");

        let response = proxy(Arc::new(NoToken)).forward(&target, request).await.unwrap();

        let body = response.body.unwrap();
        assert_eq!(body["auth"], serde_json::Value::Null);
        assert_eq!(body["body"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let target = UpstreamTarget::new("/keymanager", "http://127.0.0.1:1", AuthMode::BearerFromFile);
        let request = ProxyRequest::new(Method::GET, "eth/v1/keystores");

        let err = proxy(Arc::new(NoToken)).forward(&target, request).await.unwrap_err();
        assert!(matches!(err, ProxyError::Token(TokenError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_empty_upstream_body() {
        let base = echo_upstream().await;
        let target = UpstreamTarget::new("/rest", base, AuthMode::None);

        let response = proxy(Arc::new(NoToken))
            .forward(&target, ProxyRequest::new(Method::GET, "empty"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_non_json_upstream_body() {
        let base = echo_upstream().await;
        let target = UpstreamTarget::new("/rest", base, AuthMode::None);

        let err = proxy(Arc::new(NoToken))
            .forward(&target, ProxyRequest::new(Method::GET, "garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ResponseBody(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_hits_timeout() {
        let base = echo_upstream().await;
        let target = UpstreamTarget::new("/rest", base, AuthMode::None);
        let proxy = ReverseProxy::new(Duration::from_millis(200), Arc::new(NoToken)).unwrap();

        let err = proxy
            .forward(&target, ProxyRequest::new(Method::GET, "slow"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Transport(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = UpstreamTarget::new("/rest", format!("http://{}", addr), AuthMode::None);
        let err = proxy(Arc::new(NoToken))
            .forward(&target, ProxyRequest::new(Method::GET, "eth/v1/node/health"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Transport(_)));
    }
}
