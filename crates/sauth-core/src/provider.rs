//! Seam for concrete authentication flows.
//!
//! A provider (Twitter, Google, any OAuth or OpenID flow) owns an
//! `AuthStore` and implements the exchange with its identity service. The
//! session bookkeeping every provider shares comes from the provided methods.

use serde_json::Value;

use crate::error::Result;
use crate::store::{AuthStore, ParamMap};

pub trait AuthProvider {
    fn store(&self) -> &AuthStore;

    fn store_mut(&mut self) -> &mut AuthStore;

    fn is_authorized(&self) -> Result<bool> {
        self.store().is_authorized()
    }

    fn user_parameters(&self) -> Result<ParamMap> {
        self.store().user_parameters()
    }

    fn user_parameter(&self, key: &str) -> Result<Option<Value>> {
        self.store().user_parameter(key)
    }

    fn set_user_parameters(&self, params: ParamMap) -> Result<ParamMap> {
        self.store().set_user_parameters(params)
    }

    fn clear_auth(&self) -> Result<()> {
        self.store().clear_auth()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ProviderConfig;
    use crate::session::MemoryBackend;
    use serde_json::json;

    /// Minimal two-step provider: hands out a request token, then trades it.
    struct HandshakeProvider {
        store: AuthStore,
    }

    impl HandshakeProvider {
        fn new() -> Self {
            let config = ProviderConfig::new()
                .with("sessionKey", "handshake")
                .with("callbackUrl", "https://example.test/callback");
            Self {
                store: AuthStore::new(config, Arc::new(MemoryBackend::new())).unwrap(),
            }
        }

        fn begin(&self) -> Result<()> {
            self.store.set_request_token("req-1").map(|_| ())
        }

        fn complete(&self, verifier: &str) -> Result<bool> {
            let request: Option<String> = self.store.request_token()?;
            match request {
                Some(request) if verifier == "ok" => {
                    self.store.exchange_request_token(&format!("acc-for-{}", request))?;
                    let mut profile = ParamMap::new();
                    profile.insert("screen_name".to_string(), json!("ann"));
                    self.set_user_parameters(profile)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    impl AuthProvider for HandshakeProvider {
        fn store(&self) -> &AuthStore {
            &self.store
        }

        fn store_mut(&mut self) -> &mut AuthStore {
            &mut self.store
        }
    }

    #[test]
    fn test_provider_flow() {
        let mut provider = HandshakeProvider::new();
        assert!(!provider.is_authorized().unwrap());

        provider.begin().unwrap();
        assert!(!provider.complete("bad").unwrap());
        assert!(provider.complete("ok").unwrap());

        assert!(provider.is_authorized().unwrap());
        assert_eq!(
            provider.store().access_token::<String>().unwrap(),
            Some("acc-for-req-1".to_string())
        );
        assert_eq!(provider.user_parameter("screen_name").unwrap(), Some(json!("ann")));
        assert_eq!(
            provider.store_mut().set_session_live_time(600),
            Some(600)
        );

        provider.clear_auth().unwrap();
        assert!(!provider.is_authorized().unwrap());
        assert!(provider.user_parameters().unwrap().is_empty());
    }
}
