//! Session-scoped auth store.
//!
//! `AuthStore` is the state every session-backed provider shares: its
//! configuration, the lifetime of its session namespace, and the tokens and
//! user parameters kept inside that namespace.
//!
//! User parameters are a flat map. Values may be any JSON value, but lookups
//! only address top-level keys; there is no path syntax into nested maps.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{live_time_from, session_key_from, ConfigMap, DEFAULT_SESSION_LIVE_TIME};
use crate::error::{AuthError, Result};
use crate::keys::{
    CONFIG_SESSION_KEY, CONFIG_SESSION_LIVE_TIME, TOKEN_ACCESS, TOKEN_REQUEST, USER_PARAMETERS,
};
use crate::session::{SessionBackend, SessionNamespace};
use crate::token;

/// Flat map of user profile parameters.
pub type ParamMap = serde_json::Map<String, Value>;

/// Result of a configuration lookup that may fall back to the whole map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigEntry<'a> {
    Value(&'a Value),
    All(&'a ConfigMap),
}

/// Configuration state, kept apart from the bound namespace so it can be
/// settled before the namespace exists.
#[derive(Debug, Clone)]
struct StoreSettings {
    config: ConfigMap,
    session_key: String,
    session_live_time: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            config: ConfigMap::new(),
            session_key: String::new(),
            session_live_time: DEFAULT_SESSION_LIVE_TIME,
        }
    }
}

impl StoreSettings {
    /// Both reserved keys land in their dedicated field and stay in the
    /// generic map, holding the value actually in force.
    fn apply(&mut self, config: ConfigMap) {
        for (key, value) in config {
            match key.as_str() {
                CONFIG_SESSION_KEY => {
                    let session_key = session_key_from(&value).unwrap_or_else(|| {
                        warn!(value = %value, "Session key is not a scalar, treating as empty");
                        String::new()
                    });
                    self.session_key = session_key.clone();
                    self.config.insert(key, Value::String(session_key));
                }
                CONFIG_SESSION_LIVE_TIME => {
                    match live_time_from(&value) {
                        Some(seconds) => {
                            self.set_session_live_time(seconds);
                        }
                        None => {
                            warn!(value = %value, "Session live time is not a number, ignoring");
                        }
                    }
                    self.config
                        .insert(key, Value::from(self.session_live_time));
                }
                _ => {
                    self.config.insert(key, value);
                }
            }
        }
    }

    fn set_session_live_time(&mut self, seconds: i64) -> Option<u64> {
        match u64::try_from(seconds) {
            Ok(seconds) if seconds > 0 => {
                self.session_live_time = seconds;
                Some(seconds)
            }
            _ => {
                warn!(seconds, "Rejected non-positive session live time");
                None
            }
        }
    }

    fn open_storage(&self, backend: &Arc<dyn SessionBackend>) -> Result<SessionNamespace> {
        if self.session_key.is_empty() {
            return Err(AuthError::invalid_config("Invalid auth storage key"));
        }
        let storage = SessionNamespace::bind(backend.clone(), self.session_key.clone());
        storage.set_expiration(self.session_live_time)?;
        Ok(storage)
    }
}

/// Tokens, user parameters and configuration for one provider in one session.
#[derive(Debug)]
pub struct AuthStore {
    settings: StoreSettings,
    backend: Arc<dyn SessionBackend>,
    storage: SessionNamespace,
}

impl AuthStore {
    /// Apply `config`, then bind to (or create) the namespace named by its
    /// `sessionKey`. Fails with `InvalidConfiguration` when that key is
    /// missing or empty.
    pub fn new(config: impl Into<ConfigMap>, backend: Arc<dyn SessionBackend>) -> Result<Self> {
        let mut settings = StoreSettings::default();
        settings.apply(config.into());
        let storage = settings.open_storage(&backend)?;
        debug!(
            session_key = %settings.session_key,
            live_time = settings.session_live_time,
            "Auth store ready"
        );
        Ok(Self {
            settings,
            backend,
            storage,
        })
    }

    // ===== Configuration =====

    /// Merge `config` into the current configuration and return the result.
    ///
    /// A changed `sessionKey` or `sessionLiveTime` takes effect on the next
    /// `set_up_session_storage`.
    pub fn set_config(&mut self, config: impl Into<ConfigMap>) -> &ConfigMap {
        self.settings.apply(config.into());
        &self.settings.config
    }

    /// The value configured for `key` if there is one, else the whole map.
    pub fn get_config(&self, key: Option<&str>) -> ConfigEntry<'_> {
        match key.and_then(|key| self.settings.config.get(key)) {
            Some(value) => ConfigEntry::Value(value),
            None => ConfigEntry::All(&self.settings.config),
        }
    }

    pub fn config(&self) -> &ConfigMap {
        &self.settings.config
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.settings.config.get(key)
    }

    pub fn session_key(&self) -> &str {
        &self.settings.session_key
    }

    pub fn set_session_key(&mut self, session_key: impl Into<String>) {
        let session_key = session_key.into();
        self.settings
            .config
            .insert(CONFIG_SESSION_KEY.to_string(), Value::String(session_key.clone()));
        self.settings.session_key = session_key;
    }

    /// Accepts only positive lifetimes. Returns the new value, or `None`
    /// (leaving the lifetime unchanged) when `seconds <= 0`.
    pub fn set_session_live_time(&mut self, seconds: i64) -> Option<u64> {
        let applied = self.settings.set_session_live_time(seconds)?;
        self.settings.config.insert(
            CONFIG_SESSION_LIVE_TIME.to_string(),
            Value::from(applied),
        );
        Some(applied)
    }

    pub fn session_live_time(&self) -> u64 {
        self.settings.session_live_time
    }

    // ===== Session storage =====

    /// (Re)bind to the namespace named by the session key and restart its
    /// expiration window.
    pub fn set_up_session_storage(&mut self) -> Result<&SessionNamespace> {
        self.storage = self.settings.open_storage(&self.backend)?;
        Ok(&self.storage)
    }

    pub fn session_storage(&self) -> &SessionNamespace {
        &self.storage
    }

    // ===== Authorization state =====

    /// True iff a non-empty access token is stored.
    ///
    /// An undecodable blob reads as unauthorized; backend errors propagate.
    pub fn is_authorized(&self) -> Result<bool> {
        let Some(blob) = token::blob_of(self.storage.get(TOKEN_ACCESS)?) else {
            return Ok(false);
        };
        match token::decode::<Value>(&blob) {
            Ok(token) => Ok(!token::is_empty_value(&token)),
            Err(e) => {
                warn!(
                    session_key = %self.storage.name(),
                    error = %e,
                    "Stored access token is unreadable, treating session as unauthorized"
                );
                Ok(false)
            }
        }
    }

    /// Remove everything from the session namespace: tokens, user
    /// parameters and any provider-specific keys.
    pub fn clear_auth(&self) -> Result<()> {
        self.storage.unset_all()?;
        info!(session_key = %self.storage.name(), "Session auth cleared");
        Ok(())
    }

    // ===== User parameters =====

    pub fn user_parameters(&self) -> Result<ParamMap> {
        match self.storage.get(USER_PARAMETERS)? {
            Some(Value::Object(params)) => Ok(params),
            Some(Value::Null) | None => Ok(ParamMap::new()),
            Some(other) => {
                warn!(value = %other, "Stored user parameters are not a map, ignoring");
                Ok(ParamMap::new())
            }
        }
    }

    /// A single user parameter. `None` means the key is absent, which is
    /// distinct from a key holding `false` or `null`.
    pub fn user_parameter(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.user_parameters()?.shift_remove(key))
    }

    /// Shallow merge, last write wins per key. Returns the merged map.
    pub fn set_user_parameters<I>(&self, params: I) -> Result<ParamMap>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut merged = self.user_parameters()?;
        for (key, value) in params {
            merged.insert(key, value);
        }
        self.storage
            .set(USER_PARAMETERS, Value::Object(merged.clone()))?;
        Ok(merged)
    }

    // ===== Tokens =====

    pub fn access_token<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.read_token(TOKEN_ACCESS)
    }

    /// Store the access token and return the blob written to the session.
    pub fn set_access_token<T: Serialize + ?Sized>(&self, token: &T) -> Result<String> {
        self.write_token(TOKEN_ACCESS, token)
    }

    pub fn unset_access_token(&self) -> Result<()> {
        self.storage.unset(TOKEN_ACCESS)
    }

    pub fn request_token<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.read_token(TOKEN_REQUEST)
    }

    pub fn set_request_token<T: Serialize + ?Sized>(&self, token: &T) -> Result<String> {
        self.write_token(TOKEN_REQUEST, token)
    }

    pub fn unset_request_token(&self) -> Result<()> {
        self.storage.unset(TOKEN_REQUEST)
    }

    /// Finish a multi-step handshake: keep the access token, drop the
    /// request token it was exchanged for.
    pub fn exchange_request_token<T: Serialize + ?Sized>(&self, access_token: &T) -> Result<()> {
        self.set_access_token(access_token)?;
        self.unset_request_token()?;
        info!(session_key = %self.storage.name(), "Request token exchanged for access token");
        Ok(())
    }

    fn read_token<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match token::blob_of(self.storage.get(key)?) {
            Some(blob) => Ok(Some(token::decode(&blob)?)),
            None => Ok(None),
        }
    }

    fn write_token<T: Serialize + ?Sized>(&self, key: &str, token: &T) -> Result<String> {
        let blob = token::encode(token)?;
        self.storage.set(key, Value::String(blob.clone()))?;
        debug!(session_key = %self.storage.name(), key, "Token stored");
        Ok(blob)
    }
}
