// # Memory Secret Store
//
// In-memory implementation of SecretStore.
//
// ## Purpose
//
// Provides a simple secret store that doesn't persist across restarts.
// Useful for testing and for local runs against a development chain.
//
// ## Crash Behavior
//
// - All secrets are lost on restart/crash
// - The next invocation without `PrivateKey` generates a new signer,
//   which owns none of the names registered by the previous one

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::traits::SecretStore;
use crate::Error;

/// In-memory secret store implementation
///
/// This implementation stores all secrets in a HashMap protected by a RwLock.
/// It provides no persistence across restarts.
///
/// # Example
///
/// ```rust,no_run
/// use ens_core::secrets::MemorySecretStore;
/// use ens_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySecretStore::new();
///
///     store.put_secret("privateKey", "0x01").await?;
///     assert_eq!(store.get_secret("privateKey").await?, "0x01");
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretStore")
            .field("secrets", &"<REDACTED>")
            .finish()
    }
}

impl MemorySecretStore {
    /// Create a new empty memory secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one secret
    pub fn with_secret(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut secrets = HashMap::new();
        secrets.insert(name.into(), value.into());
        Self {
            inner: Arc::new(RwLock::new(secrets)),
        }
    }

    /// Get the number of secrets in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, Error> {
        let guard = self.inner.read().await;
        guard
            .get(name)
            .cloned()
            .ok_or_else(|| Error::secret_not_found(name))
    }

    async fn put_secret(&self, name: &str, value: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
