//! In-memory store for model-host credentials.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use pcommon::SecretString;

use crate::{ProviderError, ProviderId};

#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<ProviderId, SecretString>>,
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let manager = Self::new();
        manager.set_api_key(provider, api_key)?;
        Ok(manager)
    }

    pub fn set_api_key(
        &self,
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_blank() {
            return Err(ProviderError::authentication(format!(
                "{provider} api key must not be empty"
            )));
        }

        self.keys()?.insert(provider, api_key);
        Ok(())
    }

    pub fn has_api_key(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys()?.contains_key(&provider))
    }

    pub fn api_key(&self, provider: ProviderId) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.keys()?.get(&provider).cloned())
    }

    pub fn clear(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys()?.remove(&provider).is_some())
    }

    fn keys(&self) -> Result<MutexGuard<'_, HashMap<ProviderId, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}

impl std::fmt::Debug for SecureCredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureCredentialManager([REDACTED])")
    }
}
