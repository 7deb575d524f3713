use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Duration;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

use super::{NamespaceRecord, SessionBackend};

/// Process-local session storage.
///
/// Namespaces live in a map behind a mutex and disappear with the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    namespaces: Mutex<HashMap<String, NamespaceRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, NamespaceRecord>>> {
        self.namespaces
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory session backend lock poisoned").into())
    }

    /// Live record for `namespace`, dropping it first if it has expired.
    fn live<'a>(
        namespaces: &'a mut HashMap<String, NamespaceRecord>,
        namespace: &str,
    ) -> Option<&'a mut NamespaceRecord> {
        if namespaces.get(namespace).is_some_and(NamespaceRecord::is_expired) {
            debug!(namespace, "Dropping expired session namespace");
            namespaces.remove(namespace);
        }
        namespaces.get_mut(namespace)
    }

    /// Number of namespaces currently held, expired or not.
    pub fn namespace_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let mut namespaces = self.lock()?;
        Ok(Self::live(&mut namespaces, namespace).and_then(|record| record.values.get(key).cloned()))
    }

    fn set(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        let mut namespaces = self.lock()?;
        if Self::live(&mut namespaces, namespace).is_none() {
            namespaces.insert(namespace.to_string(), NamespaceRecord::default());
        }
        if let Some(record) = namespaces.get_mut(namespace) {
            record.values.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn unset(&self, namespace: &str, key: &str) -> Result<()> {
        let mut namespaces = self.lock()?;
        if let Some(record) = Self::live(&mut namespaces, namespace) {
            record.values.shift_remove(key);
        }
        Ok(())
    }

    fn set_expiration(&self, namespace: &str, seconds: u64) -> Result<()> {
        let mut namespaces = self.lock()?;
        if Self::live(&mut namespaces, namespace).is_none() {
            namespaces.insert(namespace.to_string(), NamespaceRecord::default());
        }
        if let Some(record) = namespaces.get_mut(namespace) {
            record.expire_in(seconds);
        }
        Ok(())
    }

    fn time_until_expiry(&self, namespace: &str) -> Result<Option<Duration>> {
        let mut namespaces = self.lock()?;
        Ok(Self::live(&mut namespaces, namespace).and_then(|record| record.time_until_expiry()))
    }

    fn unset_all(&self, namespace: &str) -> Result<()> {
        let mut namespaces = self.lock()?;
        if let Some(record) = namespaces.get_mut(namespace) {
            record.values.clear();
        }
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let mut namespaces = self.lock()?;
        Ok(Self::live(&mut namespaces, namespace)
            .map(|record| record.values.keys().cloned().collect())
            .unwrap_or_default())
    }
}
