//! The key store: one user-supplied API credential.
//!
//! The credential is deliberately *not* cached in memory. Every gateway
//! request reads it fresh through [`CredentialStore::get`], so a user
//! replacing the key mid-session affects exactly the requests issued after
//! the change.

use crate::error::LensError;
use crate::store::KeyValueStore;
use std::sync::Arc;

const CREDENTIAL_KEY: &str = "api_key";

/// Get/set access to the single stored API credential.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored credential, or `None` when unset or blank.
    pub fn get(&self) -> Result<Option<String>, LensError> {
        Ok(self
            .store
            .get(CREDENTIAL_KEY)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// The stored credential, or [`LensError::MissingCredential`].
    pub fn require(&self) -> Result<String, LensError> {
        self.get()?.ok_or(LensError::MissingCredential)
    }

    /// Store a credential, replacing any previous value.
    pub fn set(&self, credential: &str) -> Result<(), LensError> {
        self.store.set(CREDENTIAL_KEY, credential.trim())
    }

    /// Clear the stored credential.
    pub fn clear(&self) -> Result<(), LensError> {
        self.store.remove(CREDENTIAL_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn blank_credential_counts_as_missing() {
        let cred = CredentialStore::new(Arc::new(MemoryStore::new()));
        cred.set("   ").unwrap();
        assert!(cred.get().unwrap().is_none());
        assert!(matches!(
            cred.require().unwrap_err(),
            LensError::MissingCredential
        ));
    }

    #[test]
    fn set_get_clear() {
        let cred = CredentialStore::new(Arc::new(MemoryStore::new()));
        cred.set("  sk-abc  ").unwrap();
        assert_eq!(cred.require().unwrap(), "sk-abc");
        cred.clear().unwrap();
        assert!(cred.get().unwrap().is_none());
    }
}
