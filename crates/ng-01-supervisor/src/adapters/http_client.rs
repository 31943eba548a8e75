//! XML-RPC over HTTP: the transport half of the supervisor client.

use crate::domain::codec::{decode_response, encode_call, MethodResponse};
use crate::domain::error::SupervisorError;
use crate::domain::value::RpcValue;
use crate::ports::SupervisorApi;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Where supervisord's XML-RPC interface listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorEndpoint {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl SupervisorEndpoint {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    pub fn url(&self) -> String {
        let path = self.path.trim_start_matches('/');
        format!("http://{}:{}/{}", self.host, self.port, path)
    }
}

impl Default for SupervisorEndpoint {
    fn default() -> Self {
        Self::new("localhost", 5555, "/RPC2")
    }
}

/// Supervisord client. One HTTP POST per method call, no retries.
#[derive(Debug, Clone)]
pub struct SupervisorClient {
    http: reqwest::Client,
    url: String,
}

impl SupervisorClient {
    /// Build a client whose calls are each bounded by `call_timeout`.
    pub fn new(endpoint: &SupervisorEndpoint, call_timeout: Duration) -> Result<Self, SupervisorError> {
        let http = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| SupervisorError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: endpoint.url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SupervisorApi for SupervisorClient {
    async fn call_method(
        &self,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<RpcValue, SupervisorError> {
        let body = encode_call(method, &params);
        debug!(method, url = %self.url, "Calling supervisor");

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| SupervisorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupervisorError::HttpStatus(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SupervisorError::Transport(e.to_string()))?;

        match decode_response(&text)? {
            MethodResponse::Value(value) => Ok(value),
            MethodResponse::Fault(fault) => Err(SupervisorError::Fault(fault)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    /// Serve `reply` for every POST to /RPC2 and capture request bodies.
    async fn mock_supervisord(
        status: u16,
        reply: &'static str,
    ) -> (SupervisorEndpoint, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let app = Router::new().route(
            "/RPC2",
            post(move |body: String| {
                let captured = Arc::clone(&captured);
                async move {
                    captured.lock().await.push(body);
                    (
                        axum::http::StatusCode::from_u16(status).unwrap(),
                        reply,
                    )
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (SupervisorEndpoint::new("127.0.0.1", port, "/RPC2"), seen)
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(SupervisorEndpoint::default().url(), "http://localhost:5555/RPC2");
        assert_eq!(
            SupervisorEndpoint::new("10.0.0.2", 9001, "RPC2").url(),
            "http://10.0.0.2:9001/RPC2"
        );
    }

    #[tokio::test]
    async fn test_stop_process_round_trip() {
        let (endpoint, seen) = mock_supervisord(
            200,
            "<methodResponse><params><param><value><boolean>1</boolean></value></param></params></methodResponse>",
        )
        .await;
        let client = SupervisorClient::new(&endpoint, Duration::from_secs(5)).unwrap();

        let result = client.stop_process("beacon-chain", true).await.unwrap();

        assert_eq!(result, RpcValue::Bool(true));
        let bodies = seen.lock().await;
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("<methodName>supervisor.stopProcess</methodName>"));
        assert!(bodies[0].contains("<string>beacon-chain</string>"));
        assert!(bodies[0].contains("<boolean>1</boolean>"));
    }

    #[tokio::test]
    async fn test_fault_is_surfaced() {
        let (endpoint, _) = mock_supervisord(
            200,
            "<methodResponse><fault><value><struct>\
             <member><name>faultCode</name><value><int>60</int></value></member>\
             <member><name>faultString</name><value><string>ALREADY_STARTED: validator</string></value></member>\
             </struct></value></fault></methodResponse>",
        )
        .await;
        let client = SupervisorClient::new(&endpoint, Duration::from_secs(5)).unwrap();

        let err = client.start_process("validator", true).await.unwrap_err();
        let fault = err.fault().expect("fault");
        assert_eq!(fault.code, crate::fault_codes::ALREADY_STARTED);
        assert_eq!(fault.message, "ALREADY_STARTED: validator");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let (endpoint, _) = mock_supervisord(401, "Unauthorized").await;
        let client = SupervisorClient::new(&endpoint, Duration::from_secs(5)).unwrap();

        let err = client.get_all_process_info().await.unwrap_err();
        assert!(matches!(err, SupervisorError::HttpStatus(401)));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let (endpoint, _) = mock_supervisord(200, "not xml at all <").await;
        let client = SupervisorClient::new(&endpoint, Duration::from_secs(5)).unwrap();

        let err = client.get_all_process_info().await.unwrap_err();
        assert!(matches!(err, SupervisorError::Decode(_)));
    }

    #[tokio::test]
    async fn test_call_timeout_bounds_slow_supervisor() {
        let app = Router::new().route(
            "/RPC2",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "<methodResponse><params><param><value><boolean>1</boolean></value></param></params></methodResponse>"
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let endpoint = SupervisorEndpoint::new("127.0.0.1", port, "/RPC2");
        let client = SupervisorClient::new(&endpoint, Duration::from_millis(200)).unwrap();

        let err = client.stop_process("beacon-chain", true).await.unwrap_err();
        assert!(matches!(err, SupervisorError::Transport(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = SupervisorEndpoint::new("127.0.0.1", port, "/RPC2");
        let client = SupervisorClient::new(&endpoint, Duration::from_secs(5)).unwrap();

        let err = client.get_all_process_info().await.unwrap_err();
        assert!(matches!(err, SupervisorError::Transport(_)));
    }
}
