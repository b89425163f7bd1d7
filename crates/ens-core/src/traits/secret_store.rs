// # Secret Store Trait
//
// Defines the interface for the persisted signer key.
//
// ## Purpose
//
// Requests without an explicit `PrivateKey` sign with a key kept in a secret
// store, so every invocation of a deployment acts as the same account.
//
// ## Implementations
//
// - AWS SSM Parameter Store: `ens-secrets-ssm` crate
// - In-memory: [`MemorySecretStore`](crate::secrets::MemorySecretStore)

use async_trait::async_trait;

/// Trait for secret store implementations
///
/// # Error Contract
///
/// A missing secret is reported as [`Error::SecretNotFound`](crate::Error::SecretNotFound),
/// never as a generic store error: signer resolution recovers from it by
/// generating a key, and propagates everything else.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get a decrypted secret
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The secret value
    /// - `Err(Error::SecretNotFound)`: No secret under this name
    /// - `Err(Error)`: Storage error
    async fn get_secret(&self, name: &str) -> Result<String, crate::Error>;

    /// Store a secret encrypted at rest, replacing any previous value
    async fn put_secret(&self, name: &str, value: &str) -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
