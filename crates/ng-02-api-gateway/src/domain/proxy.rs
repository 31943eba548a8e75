//! Proxy request/response values.

use crate::domain::error::{ProxyError, TokenError};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::Value;

/// One inbound call to forward. Built per request and consumed once.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Remainder after the target prefix, without a leading `/`.
    pub path: String,
    pub query: Option<String>,
    /// Outbound headers. Inbound headers are never copied here.
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method,
            path: path.into(),
            query: None,
            headers,
            body: None,
        }
    }

    /// Add `Authorization: Bearer <token>`.
    pub fn with_bearer(mut self, token: &str) -> Result<Self, TokenError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| TokenError::InvalidHeader)?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    /// Attach the inbound body; an empty body means "no body".
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// `base_url + "/" + path`, plus the original query string.
    pub fn target_url(&self, base_url: &str) -> String {
        let mut url = format!("{}/{}", base_url.trim_end_matches('/'), self.path);
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Parse and re-serialize the body so malformed JSON is rejected here
    /// instead of being forwarded.
    pub fn json_body(&self) -> Result<Option<Vec<u8>>, ProxyError> {
        let Some(body) = &self.body else {
            return Ok(None);
        };
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ProxyError::RequestBody(e.to_string()))?;
        serde_json::to_vec(&value)
            .map(Some)
            .map_err(|e| ProxyError::RequestBody(e.to_string()))
    }
}

/// What the upstream answered, relayed to the caller verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    /// `None` when the upstream sent zero-length content.
    pub body: Option<Value>,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}
