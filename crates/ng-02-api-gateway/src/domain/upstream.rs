//! Upstream target table and path resolution.
//!
//! Each target owns a path prefix. An inbound path is matched against the
//! longest prefix that ends on a segment boundary, and the remainder (with
//! every nested sub-path) is what gets appended to the target's base URL.

use crate::domain::config::UpstreamsConfig;
use axum::http::Method;

/// Prefix serving the beacon-chain REST API.
pub const REST_PREFIX: &str = "/rest";
/// Prefix serving the key-manager API.
pub const KEYMANAGER_PREFIX: &str = "/keymanager";

/// How outbound headers are built for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// `Content-Type` only.
    None,
    /// Adds `Authorization: Bearer <token>`, the token re-read from the
    /// secret file on every call.
    BearerFromFile,
}

/// One proxied upstream. Immutable after startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub base_path: String,
    pub base_url: String,
    pub auth_mode: AuthMode,
    pub methods: Vec<Method>,
}

impl UpstreamTarget {
    pub fn new(base_path: impl Into<String>, base_url: impl Into<String>, auth_mode: AuthMode) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
            auth_mode,
            methods: vec![Method::GET, Method::POST],
        }
    }

    pub fn with_methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = methods;
        self
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

/// Read-only table of upstream targets, shared across requests.
#[derive(Debug, Clone)]
pub struct UpstreamTable {
    /// Sorted by descending prefix length so the first hit is the longest.
    targets: Vec<UpstreamTarget>,
}

impl UpstreamTable {
    pub fn new(mut targets: Vec<UpstreamTarget>) -> Self {
        targets.sort_by(|a, b| b.base_path.len().cmp(&a.base_path.len()));
        Self { targets }
    }

    /// The beacon REST and key-manager targets.
    pub fn from_config(config: &UpstreamsConfig) -> Self {
        Self::new(vec![
            UpstreamTarget::new(REST_PREFIX, config.rest_url.as_str(), AuthMode::None),
            UpstreamTarget::new(
                KEYMANAGER_PREFIX,
                config.keymanager_url.as_str(),
                AuthMode::BearerFromFile,
            )
            .with_methods(vec![Method::GET, Method::POST, Method::DELETE]),
        ])
    }

    /// Find the target for `path` and the remainder after its prefix.
    ///
    /// The remainder never starts with `/`. `None` is a routing miss.
    pub fn resolve<'p>(&self, path: &'p str) -> Option<(&UpstreamTarget, &'p str)> {
        self.targets.iter().find_map(|target| {
            strip_segment_prefix(path, &target.base_path).map(|rest| (target, rest))
        })
    }

    pub fn targets(&self) -> &[UpstreamTarget] {
        &self.targets
    }
}

fn strip_segment_prefix<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(prefix.trim_end_matches('/'))?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}
