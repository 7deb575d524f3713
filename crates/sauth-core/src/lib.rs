//! Session-scoped storage for authentication providers.
//!
//! This crate provides:
//! - `AuthStore`: configuration, access/request tokens and user parameters
//!   for one provider, kept in one session namespace
//! - `AuthProvider`: the trait concrete OAuth/OpenID flows implement
//! - `SessionBackend`: the storage seam, with memory and file backends
//!
//! Namespaces expire after the configured session live time (one day by
//! default). The token exchange itself belongs to the concrete provider.

pub mod config;
pub mod error;
pub mod keys;
pub mod provider;
pub mod session;
pub mod store;
pub mod token;

pub use config::{ConfigMap, ProviderConfig, DEFAULT_SESSION_LIVE_TIME};
pub use error::{AuthError, Result};
pub use provider::AuthProvider;
pub use session::{FileBackend, MemoryBackend, SessionBackend, SessionNamespace};
pub use store::{AuthStore, ConfigEntry, ParamMap};
