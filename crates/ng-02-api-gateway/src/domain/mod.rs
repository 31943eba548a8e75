//! Domain types for the gateway.
//!
//! Configuration, the upstream target table, proxy values and errors.

pub mod config;
pub mod error;
pub mod proxy;
pub mod upstream;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ApiError, ApiResult, GatewayError, ProxyError, SettingsError, TokenError};
pub use proxy::{ProxyRequest, ProxyResponse};
pub use upstream::{AuthMode, UpstreamTable, UpstreamTarget};
