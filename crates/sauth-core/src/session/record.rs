use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything a backend keeps for one namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    #[serde(default)]
    pub values: Map<String, Value>,
    /// `None` means the namespace never expires on its own
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NamespaceRecord {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| Utc::now() > at).unwrap_or(false)
    }

    /// Restart the expiration window `seconds` from now.
    pub fn expire_in(&mut self, seconds: u64) {
        let ttl = i64::try_from(seconds).ok().and_then(Duration::try_seconds);
        self.expires_at = ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl));
    }

    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|at| at - Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_never_expires() {
        let record = NamespaceRecord::default();
        assert!(!record.is_expired());
        assert!(record.time_until_expiry().is_none());
    }

    #[test]
    fn test_expire_in() {
        let mut record = NamespaceRecord::default();
        record.expire_in(120);
        assert!(!record.is_expired());
        let remaining = record.time_until_expiry().unwrap();
        assert!(remaining.num_seconds() <= 120);
        assert!(remaining.num_seconds() >= 118);

        record.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(record.is_expired());
    }

    #[test]
    fn test_huge_lifetime_does_not_overflow() {
        let mut record = NamespaceRecord::default();
        record.expire_in(u64::MAX);
        assert!(!record.is_expired());
    }
}
