use std::sync::Arc;

use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

use super::SessionBackend;

/// Handle bound to one namespace of a session backend.
///
/// Clone is cheap and clones address the same namespace.
#[derive(Debug, Clone)]
pub struct SessionNamespace {
    name: String,
    backend: Arc<dyn SessionBackend>,
}

impl SessionNamespace {
    /// Bind to `name`, creating the namespace lazily on first write.
    pub fn bind(backend: Arc<dyn SessionBackend>, name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(namespace = %name, "Session namespace bound");
        Self { name, backend }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.backend.get(&self.name, key)
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.backend.set(&self.name, key, value)
    }

    /// Read `key` and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_value(value)?)
    }

    pub fn unset(&self, key: &str) -> Result<()> {
        self.backend.unset(&self.name, key)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.backend.contains(&self.name, key)
    }

    pub fn set_expiration(&self, seconds: u64) -> Result<()> {
        debug!(namespace = %self.name, seconds, "Session namespace expiration set");
        self.backend.set_expiration(&self.name, seconds)
    }

    /// Time left before the namespace expires, `None` if it never does.
    pub fn time_until_expiry(&self) -> Result<Option<Duration>> {
        self.backend.time_until_expiry(&self.name)
    }

    pub fn unset_all(&self) -> Result<()> {
        self.backend.unset_all(&self.name)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys(&self.name)
    }
}
