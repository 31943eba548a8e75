//! Gateway configuration with validation.
//!
//! Loaded once at process start from a TOML file and passed by reference
//! into each component; nothing here changes afterwards.
//!
//! ```toml
//! [node]
//! network = "holesky"
//! name = "eth2-validator"
//!
//! [upstreams]
//! rest_url = "http://beacon:3500"
//! keymanager_url = "http://validator:7500"
//! keymanager_token_path = "/data/keymanager-token"
//!
//! [supervisor]
//! programs = ["beacon-chain", "validator"]
//! quiescence = "3s"
//! ```

use ng_01_supervisor::{RestartPlan, SupervisorEndpoint, DEFAULT_QUIESCENCE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listening socket and request limits
    pub http: HttpConfig,
    /// Identity of the node package this gateway fronts
    pub node: NodeConfig,
    /// Proxied upstream services
    pub upstreams: UpstreamsConfig,
    /// Supervisord endpoint and managed programs
    pub supervisor: SupervisorConfig,
    /// Settings file and per-network defaults
    pub settings: SettingsConfig,
    /// Outbound call bounds
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, url) in [
            ("upstreams.rest_url", &self.upstreams.rest_url),
            ("upstreams.keymanager_url", &self.upstreams.keymanager_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    field,
                    url: url.clone(),
                });
            }
        }

        if self.supervisor.programs.is_empty() {
            return Err(ConfigError::EmptyProcessList);
        }
        let unique: HashSet<_> = self.supervisor.programs.iter().collect();
        if unique.len() != self.supervisor.programs.len() {
            return Err(ConfigError::Invalid(
                "supervisor.programs contains duplicates".into(),
            ));
        }

        if self.timeouts.upstream.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "upstream timeout cannot be 0".into(),
            ));
        }
        if self.supervisor.call_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "supervisor call timeout cannot be 0".into(),
            ));
        }

        if self.http.max_body_size == 0 {
            return Err(ConfigError::Invalid("max_body_size cannot be 0".into()));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn supervisor_endpoint(&self) -> SupervisorEndpoint {
        SupervisorEndpoint::new(
            self.supervisor.host.clone(),
            self.supervisor.port,
            self.supervisor.path.clone(),
        )
    }

    pub fn restart_plan(&self) -> RestartPlan {
        RestartPlan::new(self.supervisor.programs.clone())
            .with_quiescence(self.supervisor.quiescence)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 9999)
    pub port: u16,
    /// Max inbound body size in bytes (keystore imports can be large)
    pub max_body_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 9999,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

/// Node package identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Network identifier (mainnet, gnosis, holesky, prater)
    pub network: String,
    /// Package name reported on /name
    pub name: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            name: "node-gateway".to_string(),
        }
    }
}

/// Upstream services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    /// Beacon-chain REST API base URL
    pub rest_url: String,
    /// Key-manager API base URL
    pub keymanager_url: String,
    /// File holding the key-manager bearer token
    pub keymanager_token_path: PathBuf,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            rest_url: "http://localhost:3500".to_string(),
            keymanager_url: "http://localhost:7500".to_string(),
            keymanager_token_path: PathBuf::from("/data/keymanager-token"),
        }
    }
}

/// Supervisord configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub host: String,
    pub port: u16,
    /// XML-RPC path (default: /RPC2)
    pub path: String,
    /// Program names managed by restart/stop/start, fixed at startup
    pub programs: Vec<String>,
    /// Pause between stop phase and start phase
    #[serde(with = "humantime_serde")]
    pub quiescence: Duration,
    /// Bound on a single XML-RPC call; stop with wait=true blocks until exit
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        let endpoint = SupervisorEndpoint::default();
        Self {
            host: endpoint.host,
            port: endpoint.port,
            path: endpoint.path,
            programs: vec!["beacon-chain".to_string(), "validator".to_string()],
            quiescence: DEFAULT_QUIESCENCE,
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// Settings store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Persisted settings document
    pub path: PathBuf,
    /// Directory holding defaultsettings-<network>.json
    pub defaults_dir: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/data/settings.json"),
            defaults_dir: PathBuf::from("/app/settings"),
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on each proxied upstream call
    #[serde(with = "humantime_serde")]
    pub upstream: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream: Duration::from_secs(30),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            max_age: 86400,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },
    /// Config file is not valid TOML for this schema
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    /// Upstream URL without an http(s) scheme
    #[error("{field} must be an http(s) URL, got {url:?}")]
    InvalidUrl { field: &'static str, url: String },
    /// No supervised programs configured
    #[error("supervisor.programs cannot be empty")]
    EmptyProcessList,
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Duration serialization as "3s", "500ms", "1m" or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse "3s", "500ms", "1m" or plain seconds.
pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let s = s.trim();
    // "ms" first: "500ms" also ends in 's'.
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| "invalid milliseconds")
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "invalid seconds")
    } else if let Some(mins) = s.strip_suffix('m') {
        let m = mins.trim().parse::<u64>().map_err(|_| "invalid minutes")?;
        m.checked_mul(60)
            .map(Duration::from_secs)
            .ok_or("minutes out of range")
    } else {
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "invalid duration format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 9999);
        assert_eq!(config.supervisor.quiescence, Duration::from_secs(3));
        assert_eq!(config.supervisor_endpoint().url(), "http://localhost:5555/RPC2");
    }

    #[test]
    fn test_parse_toml() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [node]
            network = "holesky"

            [upstreams]
            rest_url = "http://beacon:3500"

            [supervisor]
            programs = ["lighthouse-bn", "lighthouse-vc"]
            quiescence = "500ms"
            "#,
        )
        .unwrap();

        assert_eq!(config.node.network, "holesky");
        assert_eq!(config.upstreams.rest_url, "http://beacon:3500");
        assert_eq!(config.upstreams.keymanager_url, "http://localhost:7500");
        let plan = config.restart_plan();
        assert_eq!(plan.processes, vec!["lighthouse-bn", "lighthouse-vc"]);
        assert_eq!(plan.quiescence, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_rejects_unknown_duration() {
        let err = GatewayConfig::from_toml_str("[timeouts]\nupstream = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_programs_rejected() {
        let mut config = GatewayConfig::default();
        config.supervisor.programs.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyProcessList)));
    }

    #[test]
    fn test_duplicate_programs_rejected() {
        let mut config = GatewayConfig::default();
        config.supervisor.programs = vec!["a".into(), "a".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_url_scheme_required() {
        let mut config = GatewayConfig::default();
        config.upstreams.keymanager_url = "validator:7500".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { field: "upstreams.keymanager_url", .. })
        ));
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("7"), Ok(Duration::from_secs(7)));
        assert!(parse_duration("fast").is_err());
    }

    #[test]
    fn test_parse_duration_minute_overflow() {
        assert_eq!(
            parse_duration(&format!("{}m", u64::MAX)),
            Err("minutes out of range")
        );
        assert!(GatewayConfig::from_toml_str("[timeouts]\nupstream = \"18446744073709551615m\"").is_err());
    }
}
