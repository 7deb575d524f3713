//! Session namespaces and the backends that persist them.
//!
//! This module provides:
//! - `SessionBackend`: the storage seam (per-key get/set/unset, expiration, unset-all)
//! - `SessionNamespace`: a handle bound to one namespace of a backend
//! - `MemoryBackend`: process-local storage, mostly for tests and single-process apps
//! - `FileBackend`: one JSON file per namespace in a directory
//!
//! A namespace whose expiration has passed is purged the next time it is
//! read and behaves as empty.

pub mod file;
pub mod memory;
pub mod namespace;
pub mod record;

use chrono::Duration;
use serde_json::Value;

use crate::error::Result;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use namespace::SessionNamespace;
pub use record::NamespaceRecord;

/// Storage for session namespaces.
///
/// Each write is expected to be atomic per key. Backends are shared between
/// stores, so they take `&self` and handle their own synchronization.
pub trait SessionBackend: std::fmt::Debug + Send + Sync {
    /// Value stored under `key`, or `None` if absent or the namespace expired.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>>;

    fn set(&self, namespace: &str, key: &str, value: Value) -> Result<()>;

    /// Remove a single key. Removing an absent key is not an error.
    fn unset(&self, namespace: &str, key: &str) -> Result<()>;

    /// Restart the namespace expiration window, `seconds` from now.
    fn set_expiration(&self, namespace: &str, seconds: u64) -> Result<()>;

    /// Time left in the expiration window of a live namespace.
    fn time_until_expiry(&self, namespace: &str) -> Result<Option<Duration>>;

    /// Remove every key in the namespace.
    fn unset_all(&self, namespace: &str) -> Result<()>;

    /// Keys currently stored in the namespace, in insertion order.
    fn keys(&self, namespace: &str) -> Result<Vec<String>>;

    fn contains(&self, namespace: &str, key: &str) -> Result<bool> {
        Ok(self.get(namespace, key)?.is_some())
    }
}
