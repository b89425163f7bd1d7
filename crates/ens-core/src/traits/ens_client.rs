// # ENS Client Trait
//
// Defines the interface to the ENS contracts on an Ethereum node.
//
// ## Implementations
//
// - alloy JSON-RPC client: `ens-client-alloy` crate
//
// ## Usage
//
// ```rust,ignore
// use ens_core::traits::EnsClient;
//
// async fn point(client: &dyn EnsClient) -> ens_core::Result<()> {
//     let resolver = client.addr("resolver.eth").await?;
//     client.set_resolver("foo.test", resolver).await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

use crate::config::GasConfig;
use crate::error::ChainError;
use crate::resource::SetterCall;
use crate::signer::{Address, SigningKey};

/// Interface id of the ETH registrar controller, looked up on the resolver of `eth`
pub const ETH_CONTROLLER_INTERFACE_ID: [u8; 4] = [0x01, 0x8f, 0xac, 0x06];

/// Hash of a mined transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Trait for ENS client implementations
///
/// Every method is one read or one transaction round-trip. Writes return
/// once the transaction is mined and fail if it reverted.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ JSON-RPC calls to the configured endpoint only
/// - ✅ Sign transactions with the key it was connected with
/// - ✅ Classify failures into [`ChainErrorKind`](crate::error::ChainErrorKind)
///
/// ## Forbidden Capabilities
/// - ❌ Retry or remediate (owned by `Reconciler`)
/// - ❌ Decide which registrar or resolver to use (owned by `Reconciler`)
/// - ❌ Access the secret store (owned by `CustomResourceHandler`)
///
/// # Error Contract
///
/// - A write to a name without a resolver fails with `NameNotFound`
/// - A transaction the signer cannot pay for fails with `InsufficientFunds`
#[async_trait]
pub trait EnsClient: Send + Sync {
    /// Owner of `name` in the registry (zero if unowned)
    async fn owner(&self, name: &str) -> Result<Address, ChainError>;

    /// Resolver set for `name`, `None` if unset
    async fn resolver(&self, name: &str) -> Result<Option<Address>, ChainError>;

    /// `addr` record of `name`, read through its resolver
    ///
    /// Fails with `NameNotFound` if `name` has no resolver.
    async fn addr(&self, name: &str) -> Result<Address, ChainError>;

    /// `interfaceImplementer` of `name` for an EIP-165 interface id
    ///
    /// Fails with `NameNotFound` if `name` has no resolver.
    async fn interface_implementer(
        &self,
        name: &str,
        interface_id: [u8; 4],
    ) -> Result<Address, ChainError>;

    /// Set the resolver of `name` in the registry
    async fn set_resolver(&self, name: &str, resolver: Address) -> Result<TxHash, ChainError>;

    /// Invoke the record setter on the resolver of `name`
    ///
    /// Fails with `NameNotFound` if `name` has no resolver.
    async fn apply(&self, name: &str, call: &SetterCall) -> Result<TxHash, ChainError>;

    /// `claim(owner)` on the reverse registrar
    async fn claim_reverse(&self, registrar: Address, owner: Address)
    -> Result<TxHash, ChainError>;

    /// `register(labelHash, owner)` on the test registrar
    async fn register_test(
        &self,
        registrar: Address,
        label_hash: [u8; 32],
        owner: Address,
    ) -> Result<TxHash, ChainError>;

    /// `register(label, owner, duration, secret)` on the ETH registrar controller
    async fn register_eth(
        &self,
        controller: Address,
        label: &str,
        owner: Address,
        duration_secs: u64,
        secret: [u8; 32],
    ) -> Result<TxHash, ChainError>;

    /// Deploy a new DNS resolver contract and return its address
    async fn deploy_dns_resolver(&self) -> Result<Address, ChainError>;

    /// Network identifier of the connected node
    async fn network_id(&self) -> Result<u64, ChainError>;

    /// Get the client name (for logging/debugging)
    fn client_name(&self) -> &'static str;
}

/// Connection parameters for one invocation
#[derive(Debug, Clone)]
pub struct ClientParams {
    /// JSON-RPC endpoint
    pub endpoint: String,
    /// Key that signs every transaction
    pub signer: SigningKey,
    /// ENS registry address
    pub registry: Address,
    /// Gas limits
    pub gas: GasConfig,
}

/// Helper trait for connecting ENS clients per invocation
pub trait EnsClientFactory: Send + Sync {
    /// Create an EnsClient bound to an endpoint and signer
    ///
    /// # Returns
    ///
    /// A boxed EnsClient trait object
    fn connect(&self, params: &ClientParams) -> Result<Box<dyn EnsClient>, crate::Error>;
}
