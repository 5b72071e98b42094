//! Session configuration
//!
//! Loaded from a JSON file, overlaid with `FERMENT_*` environment variables,
//! then validated before the session is built.

use crate::errors::FermentError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "FERMENT_";

/// Default port of the local blob HTTP server.
pub const DEFAULT_BLOBS_PORT: u16 = 7777;

/// Default deadline for a response on the blob bridge.
pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 30_000;

/// Follow-related settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FriendsConfig {
    /// Scope stamped onto every follow message. Meaning is owned by the
    /// message schema.
    pub scope: Option<String>,
}

/// Cross-process bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// How long a dispatched call waits for its response before eviction.
    pub response_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: DEFAULT_BRIDGE_TIMEOUT_MS,
        }
    }
}

impl BridgeConfig {
    /// Response deadline as a `Duration`.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FermentConfig {
    /// Follow settings
    pub friends: FriendsConfig,
    /// Port of the local blob server used to build blob URLs
    pub blobs_port: u16,
    /// Blob bridge settings
    pub bridge: BridgeConfig,
}

impl Default for FermentConfig {
    fn default() -> Self {
        Self {
            friends: FriendsConfig::default(),
            blobs_port: DEFAULT_BLOBS_PORT,
            bridge: BridgeConfig::default(),
        }
    }
}

impl FermentConfig {
    /// Load configuration from a JSON file. Missing keys take defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, FermentError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FermentError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, FermentError> {
        serde_json::from_str(content)
            .map_err(|e| FermentError::config(format!("Invalid JSON: {e}")))
    }

    /// Overlay `FERMENT_*` variables from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), FermentError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Overlay overrides from `(name, value)` pairs. Names without the
    /// `FERMENT_` prefix are ignored, as are unknown keys.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), FermentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "FRIENDS_SCOPE" => {
                    self.friends.scope = if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    };
                }
                "BLOBS_PORT" => {
                    self.blobs_port = value.parse().map_err(|e| {
                        FermentError::config(format!(
                            "{key} is not a port: {e}",
                            key = key.as_ref()
                        ))
                    })?;
                }
                "BRIDGE_TIMEOUT_MS" => {
                    self.bridge.response_timeout_ms = value.parse().map_err(|e| {
                        FermentError::config(format!(
                            "{key} is not a duration in ms: {e}",
                            key = key.as_ref()
                        ))
                    })?;
                }
                other => {
                    tracing::trace!(key = other, "ignoring unknown config override");
                }
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), FermentError> {
        if self.blobs_port == 0 {
            return Err(FermentError::config("blobsPort must be non-zero"));
        }
        if self.bridge.response_timeout_ms == 0 {
            return Err(FermentError::config(
                "bridge.responseTimeoutMs must be non-zero",
            ));
        }
        Ok(())
    }

    /// Load, overlay the environment, and validate in one step.
    pub fn load(path: &Path) -> Result<Self, FermentError> {
        let mut config = Self::load_from_file(path)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style scope setter.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.friends.scope = Some(scope.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = FermentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.friends.scope, None);
        assert_eq!(config.blobs_port, DEFAULT_BLOBS_PORT);
    }

    #[test]
    fn test_load_from_file_with_partial_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"friends": {{"scope": "public"}}, "blobsPort": 8989}}"#).unwrap();

        let config = FermentConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.friends.scope.as_deref(), Some("public"));
        assert_eq!(config.blobs_port, 8989);
        assert_eq!(config.bridge, BridgeConfig::default());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err =
            FermentConfig::load_from_file(Path::new("/nonexistent/ferment.json")).unwrap_err();
        assert!(matches!(err, FermentError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FermentConfig::default();
        config
            .merge_with_vars([
                ("FERMENT_FRIENDS_SCOPE", "local"),
                ("FERMENT_BLOBS_PORT", "9000"),
                ("FERMENT_BRIDGE_TIMEOUT_MS", "250"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();

        assert_eq!(config.friends.scope.as_deref(), Some("local"));
        assert_eq!(config.blobs_port, 9000);
        assert_eq!(config.bridge.response_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_bad_port_override_rejected() {
        let mut config = FermentConfig::default();
        let err = config
            .merge_with_vars([("FERMENT_BLOBS_PORT", "not-a-port")])
            .unwrap_err();
        assert!(err.to_string().contains("FERMENT_BLOBS_PORT"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = FermentConfig::default();
        config.blobs_port = 0;
        assert!(config.validate().is_err());

        let mut config = FermentConfig::default();
        config.bridge.response_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
