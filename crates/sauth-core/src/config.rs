//! Provider configuration.
//!
//! A provider is configured with a flat, ordered map of JSON values. Two
//! keys are recognized by the store itself (`sessionKey` and
//! `sessionLiveTime`); everything else belongs to the concrete provider and
//! passes through untouched.
//!
//! Configuration can be built in code or loaded from a JSON file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Application name used for the default session directory
const APP_NAME: &str = "sauth";

/// Directory (under the cache dir) holding file-backed sessions
const SESSIONS_DIR: &str = "sessions";

/// Default namespace lifetime: one day.
pub const DEFAULT_SESSION_LIVE_TIME: u64 = 86_400;

/// Ordered string-keyed map of configuration values.
pub type ConfigMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    values: ConfigMap,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn from_map(values: ConfigMap) -> Self {
        Self { values }
    }

    /// Parse configuration from JSON text. The document must be an object.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| AuthError::invalid_config(format!("Malformed configuration: {}", e)))?;
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(AuthError::unexpected_config(
                "Configuration must be a JSON object",
                &other,
            )),
        }
    }

    /// Load configuration from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &ConfigMap {
        &self.values
    }

    pub fn into_map(self) -> ConfigMap {
        self.values
    }
}

impl From<ConfigMap> for ProviderConfig {
    fn from(values: ConfigMap) -> Self {
        Self::from_map(values)
    }
}

impl From<ProviderConfig> for ConfigMap {
    fn from(config: ProviderConfig) -> Self {
        config.values
    }
}

/// Coerce a configured session key to text.
///
/// Scalars are rendered as text; null and containers yield `None`, which the
/// store treats as an empty key.
pub fn session_key_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read a configured lifetime as whole seconds.
///
/// Accepts integers, fractional numbers (truncated) and numeric strings.
pub fn live_time_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Default directory for file-backed sessions: `<cache_dir>/sauth/sessions`.
pub fn default_session_dir() -> Result<PathBuf> {
    let cache_dir =
        dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME).join(SESSIONS_DIR))
}
