// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! # Node Gateway
//!
//! Single HTTP entry point in front of a containerized Ethereum node: the
//! beacon-chain REST API, the validator key-manager API and the supervisord
//! that runs both.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         NODE GATEWAY (:9999)                          │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │        Trace → CORS → BodyLimit                                       │
//! │                 │                                                     │
//! │  ┌──────────────┼───────────────────┬───────────────────────┐        │
//! │  ▼              ▼                   ▼                       ▼        │
//! │ /rest/*     /keymanager/*      /service/*        /settings, /ping …  │
//! │  │              │ Bearer <token>    │                                 │
//! │  │   ┌──────────┴──────┐   ┌────────┴────────────┐                    │
//! │  │   │ FileTokenProvider│   │ RestartOrchestrator │                    │
//! │  │   └─────────────────┘   └────────┬────────────┘                    │
//! │  ▼              ▼                   ▼                                 │
//! │  ReverseProxy (reqwest, JSON)   SupervisorClient (XML-RPC)            │
//! └──┬──────────────┬───────────────────┬────────────────────────────────┘
//!    ▼              ▼                   ▼
//!  beacon:3500   validator:7500    supervisord:5555/RPC2
//! ```
//!
//! Proxied prefixes are resolved by [`UpstreamTable`] from the router
//! fallback. Upstream status codes are relayed unchanged; transport failures
//! become `500 { "error": ... }`.
//!
//! ## Usage
//!
//! ```ignore
//! use ng_02_api_gateway::{GatewayConfig, GatewayService};
//!
//! let config = GatewayConfig::load("/etc/node-gateway/gateway.toml")?;
//! let service = GatewayService::new(config)?;
//! service.serve(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

pub use adapters::{DefaultSettingsCatalog, FileSettingsStore, FileTokenProvider, ReverseProxy};
pub use domain::config::{parse_duration, ConfigError, GatewayConfig};
pub use domain::error::{ApiError, GatewayError, ProxyError, SettingsError, TokenError};
pub use domain::proxy::{ProxyRequest, ProxyResponse};
pub use domain::upstream::{AuthMode, UpstreamTable, UpstreamTarget};
pub use middleware::GatewayMetrics;
pub use ports::{SettingsStore, TokenProvider};
pub use router::{build_router, AppState};
pub use service::GatewayService;
