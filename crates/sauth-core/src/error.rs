use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Session backend error: {0:#}")]
    Backend(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Maximum length of a configuration value echoed back in error messages
const MAX_ERROR_VALUE_LENGTH: usize = 120;

impl AuthError {
    /// Truncate a value to avoid logging excessive data
    fn truncate_value(value: &str) -> String {
        if value.len() <= MAX_ERROR_VALUE_LENGTH {
            value.to_string()
        } else {
            let cut: String = value.chars().take(MAX_ERROR_VALUE_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, value.len())
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        AuthError::InvalidConfiguration(message.into())
    }

    pub fn unexpected_config(what: &str, value: &serde_json::Value) -> Self {
        AuthError::InvalidConfiguration(format!(
            "{}: {}",
            what,
            Self::truncate_value(&value.to_string())
        ))
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, AuthError::InvalidConfiguration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_value() {
        let long = "x".repeat(500);
        let err = AuthError::unexpected_config("Expected an object", &serde_json::json!(long));
        let message = err.to_string();
        assert!(message.contains("truncated"));
        assert!(message.len() < 300);
    }

    #[test]
    fn test_backend_error_keeps_context() {
        let source = anyhow::anyhow!("disk full").context("Failed to write session file");
        let err = AuthError::from(source);
        assert!(err.to_string().contains("Failed to write session file"));
        assert!(err.to_string().contains("disk full"));
        assert!(!err.is_invalid_configuration());
    }
}
