//! Configuration loading: TOML file, then environment overrides.
//!
//! The container image sets a handful of variables per node package; those
//! win over whatever the file says.

use anyhow::{Context, Result};
use ng_02_api_gateway::GatewayConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Path of the config file when `GATEWAY_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/node-gateway/gateway.toml";

pub const ENV_CONFIG: &str = "GATEWAY_CONFIG";
pub const ENV_NETWORK: &str = "GATEWAY_NETWORK";
pub const ENV_PORT: &str = "GATEWAY_PORT";
pub const ENV_REST_URL: &str = "GATEWAY_REST_URL";
pub const ENV_KEYMANAGER_URL: &str = "GATEWAY_KEYMANAGER_URL";
pub const ENV_KEYMANAGER_TOKEN_PATH: &str = "GATEWAY_KEYMANAGER_TOKEN_PATH";
/// Comma-separated supervisord program names.
pub const ENV_SUPERVISOR_PROGRAMS: &str = "GATEWAY_SUPERVISOR_PROGRAMS";

/// Load from the process environment.
pub fn load_config() -> Result<GatewayConfig> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Load using `lookup` for environment variables.
pub fn load_config_with(lookup: impl Fn(&str) -> Option<String>) -> Result<GatewayConfig> {
    let path = lookup(ENV_CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = read_file(&path)?;
    apply_env_overrides(&mut config, lookup);
    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig> {
    if !path.exists() {
        info!(path = %path.display(), "No config file, using defaults");
        return Ok(GatewayConfig::default());
    }
    let config = GatewayConfig::load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Overwrite config fields from environment variables that are set.
pub fn apply_env_overrides(config: &mut GatewayConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(network) = lookup(ENV_NETWORK) {
        config.node.network = network;
    }

    if let Some(port) = lookup(ENV_PORT) {
        match port.parse() {
            Ok(p) => config.http.port = p,
            Err(_) => warn!(value = %port, "{} is not a valid port, ignoring", ENV_PORT),
        }
    }

    if let Some(url) = lookup(ENV_REST_URL) {
        config.upstreams.rest_url = url;
    }
    if let Some(url) = lookup(ENV_KEYMANAGER_URL) {
        config.upstreams.keymanager_url = url;
    }
    if let Some(path) = lookup(ENV_KEYMANAGER_TOKEN_PATH) {
        config.upstreams.keymanager_token_path = PathBuf::from(path);
    }

    if let Some(programs) = lookup(ENV_SUPERVISOR_PROGRAMS) {
        config.supervisor.programs = programs
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }
}
