//! Outbound ports for the gateway.
//!
//! The supervisor port lives in `ng-01-supervisor`; these cover the secret
//! file and the settings document.

use crate::domain::error::{SettingsError, TokenError};
use async_trait::async_trait;
use serde_json::Value;

/// Source of the key-manager bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch the token as of now. Never cached between calls.
    async fn current_token(&self) -> Result<String, TokenError>;
}

/// Persisted settings document.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Value, SettingsError>;

    async fn save(&self, settings: &Value) -> Result<(), SettingsError>;
}
