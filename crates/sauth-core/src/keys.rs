//! Reserved key names.
//!
//! Keeping them in one place makes it easy to find every key the
//! store reads or writes, both in configuration and in the session.

// ── Configuration keys ─────────────────────────────────────

/// Configuration key naming the session namespace.
pub const CONFIG_SESSION_KEY: &str = "sessionKey";

/// Configuration key holding the namespace lifetime in seconds.
pub const CONFIG_SESSION_LIVE_TIME: &str = "sessionLiveTime";

// ── Session keys ───────────────────────────────────────────

/// Session key under which the serialized access token lives.
pub const TOKEN_ACCESS: &str = "tokenAccess";

/// Session key under which the serialized request token lives.
pub const TOKEN_REQUEST: &str = "tokenRequest";

/// Session key holding the flat user-parameter map.
pub const USER_PARAMETERS: &str = "userParameters";
