//! Settings document on disk and the per-network defaults catalog.

use crate::domain::error::SettingsError;
use crate::ports::SettingsStore;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Networks that ship their own defaults; anything else uses mainnet's.
const KNOWN_NETWORKS: [&str; 3] = ["gnosis", "holesky", "prater"];
const FALLBACK_NETWORK: &str = "mainnet";

/// JSON settings file. Concurrent saves are last-writer-wins.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Value, SettingsError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SettingsError::NotFound(self.path.display().to_string()),
                _ => SettingsError::Io(e.to_string()),
            })?;
        serde_json::from_str(&text).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    async fn save(&self, settings: &Value) -> Result<(), SettingsError> {
        let text = to_pretty_json(settings)?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| SettingsError::Io(e.to_string()))?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// Serialize with four-space indentation.
fn to_pretty_json(value: &Value) -> Result<Vec<u8>, SettingsError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| SettingsError::Parse(e.to_string()))?;
    Ok(out)
}

/// Directory of `defaultsettings-<network>.json` documents.
#[derive(Debug, Clone)]
pub struct DefaultSettingsCatalog {
    dir: PathBuf,
}

impl DefaultSettingsCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Network whose defaults file is used for `network`.
    pub fn resolve_network(network: &str) -> &str {
        KNOWN_NETWORKS
            .iter()
            .copied()
            .find(|known| *known == network)
            .unwrap_or(FALLBACK_NETWORK)
    }

    pub fn file_for(&self, network: &str) -> PathBuf {
        self.dir.join(format!(
            "defaultsettings-{}.json",
            Self::resolve_network(network)
        ))
    }

    /// Defaults for `network`. A missing or unreadable file yields `{}`.
    pub async fn defaults_for(&self, network: &str) -> Value {
        let path = self.file_for(network);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Default settings unavailable");
                return Value::Object(Default::default());
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Default settings are not valid JSON");
            Value::Object(Default::default())
        })
    }
}
