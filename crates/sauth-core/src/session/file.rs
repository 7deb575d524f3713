use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use chrono::Duration;
use serde_json::Value;
use tracing::debug;

use crate::config::default_session_dir;
use crate::error::Result;

use super::{NamespaceRecord, SessionBackend};

/// Extension of namespace files
const FILE_EXTENSION: &str = "json";

/// File-backed session storage.
///
/// Each namespace is one JSON document in `dir`. A missing file is an empty
/// namespace. Writes go to a temporary file first and are renamed into
/// place, so a reader never sees a half-written record.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Backend rooted at the platform cache directory.
    pub fn in_default_dir() -> Result<Self> {
        Self::new(default_session_dir()?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("File session backend lock poisoned").into())
    }

    fn record_path(&self, namespace: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_file_stem(namespace), FILE_EXTENSION))
    }

    /// Load the live record for `namespace`, deleting it if it has expired.
    fn load(&self, namespace: &str) -> Result<Option<NamespaceRecord>> {
        let path = self.record_path(namespace);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        let record: NamespaceRecord = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))?;

        if record.is_expired() {
            debug!(namespace, "Removing expired session file");
            self.remove(namespace)?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    fn save(&self, namespace: &str, record: &NamespaceRecord) -> Result<()> {
        let path = self.record_path(namespace);
        let tmp = path.with_extension("tmp");
        let contents = serde_json::to_string_pretty(record)?;
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write session file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace session file: {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        let path = self.record_path(namespace);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
        }
        Ok(())
    }

    /// Apply `change` to the live record (or a fresh one) and persist it.
    fn modify(&self, namespace: &str, change: impl FnOnce(&mut NamespaceRecord)) -> Result<()> {
        let _guard = self.lock()?;
        let mut record = self.load(namespace)?.unwrap_or_default();
        change(&mut record);
        self.save(namespace, &record)
    }
}

impl SessionBackend for FileBackend {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock()?;
        Ok(self
            .load(namespace)?
            .and_then(|mut record| record.values.shift_remove(key)))
    }

    fn set(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        self.modify(namespace, |record| {
            record.values.insert(key.to_string(), value);
        })
    }

    fn unset(&self, namespace: &str, key: &str) -> Result<()> {
        let _guard = self.lock()?;
        if let Some(mut record) = self.load(namespace)? {
            if record.values.shift_remove(key).is_some() {
                self.save(namespace, &record)?;
            }
        }
        Ok(())
    }

    fn set_expiration(&self, namespace: &str, seconds: u64) -> Result<()> {
        self.modify(namespace, |record| record.expire_in(seconds))
    }

    fn time_until_expiry(&self, namespace: &str) -> Result<Option<Duration>> {
        let _guard = self.lock()?;
        Ok(self
            .load(namespace)?
            .and_then(|record| record.time_until_expiry()))
    }

    fn unset_all(&self, namespace: &str) -> Result<()> {
        let _guard = self.lock()?;
        if let Some(mut record) = self.load(namespace)? {
            record.values.clear();
            self.save(namespace, &record)?;
        }
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let _guard = self.lock()?;
        Ok(self
            .load(namespace)?
            .map(|record| record.values.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_-]` so any namespace name
/// maps to a distinct, portable file stem.
fn encode_file_stem(namespace: &str) -> String {
    let mut stem = String::with_capacity(namespace.len());
    for byte in namespace.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(byte as char);
        } else {
            let _ = write!(stem, "%{:02X}", byte);
        }
    }
    stem
}
