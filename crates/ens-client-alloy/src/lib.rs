// # alloy ENS Client
//
// This crate provides the EnsClient implementation for the ENS handler,
// talking JSON-RPC to an Ethereum node through an alloy provider.
//
// ## Implementation Status
//
// - ✅ One provider per invocation, bound to the request's endpoint and signer
// - ✅ Transactions signed locally and awaited until mined
// - ✅ Reverted receipts reported as `Reverted`
// - ✅ Node errors classified into `ChainErrorKind`
// - ✅ Fixed gas limits from `GasConfig`
// - ❌ NO retry logic (owned by Reconciler)
// - ❌ NO registrar or resolver selection (owned by Reconciler)
// - ❌ NO generic setters: kinds without a typed binding are `Unsupported`
//   before any RPC, so they never reach `NameNotFound` remediation
//
// ## Trust Level: Untrusted (ENS Client)
//
// **Allowed Capabilities**:
// - ✅ JSON-RPC calls to the configured endpoint only
// - ✅ Sign with the key it was connected with
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Access the secret store
//
// ## Security Requirements
//
// - The private key NEVER appears in logs or Debug output
//
// ## Contracts
//
// - ENS registry: `owner`, `resolver`, `setResolver`
// - Public resolver: `addr`, `interfaceImplementer`, record setters
// - DNS resolver: `setDnsrr`, deployed from configured creation bytecode
// - Reverse registrar: `claim`
// - Test registrar: `register(bytes32,address)`
// - ETH registrar controller: `register(string,address,uint256,bytes32)`

use alloy::contract::SolCallBuilder;
use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{B256, Bytes, FixedBytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use ens_core::error::{ChainError, ChainErrorKind};
use ens_core::resource::SetterCall;
use ens_core::traits::{ClientParams, EnsClient, EnsClientFactory, TxHash};
use ens_core::{Address, Error, GasConfig, Result};

sol! {
    /// ENS registry
    #[sol(rpc)]
    contract EnsRegistry {
        function owner(bytes32 node) external view returns (address);
        function resolver(bytes32 node) external view returns (address);
        function setResolver(bytes32 node, address resolver) external;
    }

    /// Public resolver
    #[sol(rpc)]
    contract PublicResolver {
        function addr(bytes32 node) external view returns (address);
        function interfaceImplementer(bytes32 node, bytes4 interfaceID) external view returns (address);
        function setAddr(bytes32 node, address addr) external;
        function setName(bytes32 node, string name) external;
        function setText(bytes32 node, string key, string value) external;
        function setContent(bytes32 node, bytes32 hash) external;
        function setContenthash(bytes32 node, bytes hash) external;
        function setPubkey(bytes32 node, bytes32 x, bytes32 y) external;
        function setABI(bytes32 node, uint256 contentType, bytes data) external;
        function setInterface(bytes32 node, bytes4 interfaceID, address implementer) external;
    }

    /// DNS resolver
    #[sol(rpc)]
    contract DnsResolver {
        function setDnsrr(bytes32 node, bytes data) external;
    }

    /// Reverse registrar
    #[sol(rpc)]
    contract ReverseRegistrar {
        function claim(address owner) external returns (bytes32);
    }

    /// Test registrar
    #[sol(rpc)]
    contract TestRegistrar {
        function register(bytes32 label, address owner) external;
    }

    /// ETH registrar controller
    #[sol(rpc)]
    contract EthRegistrarController {
        function register(string name, address owner, uint256 duration, bytes32 secret) external payable;
    }
}

fn to_alloy(address: Address) -> alloy::primitives::Address {
    alloy::primitives::Address::from(*address.as_bytes())
}

fn from_alloy(address: alloy::primitives::Address) -> Address {
    Address::new(address.0.0)
}

fn node(name: &str) -> std::result::Result<B256, ChainError> {
    ens_core::name::namehash(name)
        .map(B256::from)
        .map_err(|e| ChainError::new(ChainErrorKind::Unsupported, e.to_string()))
}

fn no_binding(method: &str) -> ChainError {
    ChainError::unsupported(format!("{} has no contract binding", method))
}

/// Map a node or transport error to a chain error kind
///
/// Nodes report these conditions only as message text, so this is the one
/// place that inspects it.
pub fn classify(err: impl std::fmt::Display) -> ChainError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("insufficient funds") {
        ChainError::insufficient_funds(message)
    } else if lower.contains("revert") {
        ChainError::new(ChainErrorKind::Reverted, message)
    } else {
        ChainError::transport(message)
    }
}

/// alloy ENS client
///
/// # Trust Level: Untrusted
///
/// Stateless beyond its provider; all coordination (retries, remediation)
/// is owned by `Reconciler`.
pub struct AlloyEnsClient {
    provider: DynProvider,

    /// ENS registry address
    registry: Address,

    gas: GasConfig,

    /// Creation bytecode for `deploy_dns_resolver`
    dns_resolver_bytecode: Option<Bytes>,

    /// Signer account (the key itself lives in the provider's wallet)
    signer: Address,

    endpoint: String,
}

// Custom Debug implementation that never reaches into the wallet
impl std::fmt::Debug for AlloyEnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyEnsClient")
            .field("endpoint", &self.endpoint)
            .field("registry", &self.registry)
            .field("signer", &self.signer)
            .field("key", &"<REDACTED>")
            .finish()
    }
}

impl AlloyEnsClient {
    /// Connect a client to `params.endpoint`, signing with `params.signer`
    ///
    /// No request is made until the first call.
    pub fn connect(params: &ClientParams, dns_resolver_bytecode: Option<Bytes>) -> Result<Self> {
        let url: Url = params
            .endpoint
            .parse()
            .map_err(|e| Error::config(format!("Invalid endpoint '{}': {}", params.endpoint, e)))?;

        let signer = PrivateKeySigner::from_bytes(&B256::from(params.signer.to_bytes()))
            .map_err(|_| Error::invalid_input("Private key is not a valid secp256k1 scalar"))?;
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        tracing::debug!(
            "Connected ENS client to {} as {:?}",
            params.endpoint,
            params.signer.address()
        );

        Ok(Self {
            provider,
            registry: params.registry,
            gas: params.gas,
            dns_resolver_bytecode,
            signer: params.signer.address(),
            endpoint: params.endpoint.clone(),
        })
    }

    fn registry(&self) -> EnsRegistry::EnsRegistryInstance<DynProvider> {
        EnsRegistry::new(to_alloy(self.registry), self.provider.clone())
    }

    /// Resolver of `name`, or `NameNotFound`
    async fn require_resolver(&self, name: &str) -> std::result::Result<Address, ChainError> {
        self.resolver(name)
            .await?
            .ok_or_else(|| ChainError::name_not_found(name))
    }

    /// Send a contract call with the setter gas limit and wait for its receipt
    async fn transact<C: SolCall + Send + Sync>(
        &self,
        what: &str,
        call: SolCallBuilder<&DynProvider, C>,
    ) -> std::result::Result<TxHash, ChainError> {
        let pending = call.gas(self.gas.setter).send().await.map_err(classify)?;
        let receipt = pending.get_receipt().await.map_err(classify)?;

        if !receipt.status() {
            return Err(ChainError::new(
                ChainErrorKind::Reverted,
                format!("{} reverted in {}", what, receipt.transaction_hash),
            ));
        }

        tracing::debug!("{} mined in {}", what, receipt.transaction_hash);
        Ok(TxHash(receipt.transaction_hash.0))
    }
}

#[async_trait]
impl EnsClient for AlloyEnsClient {
    async fn owner(&self, name: &str) -> std::result::Result<Address, ChainError> {
        let owner = self
            .registry()
            .owner(node(name)?)
            .call()
            .await
            .map_err(classify)?;
        Ok(from_alloy(owner))
    }

    async fn resolver(&self, name: &str) -> std::result::Result<Option<Address>, ChainError> {
        let resolver = self
            .registry()
            .resolver(node(name)?)
            .call()
            .await
            .map_err(classify)?;
        let resolver = from_alloy(resolver);
        Ok((!resolver.is_zero()).then_some(resolver))
    }

    async fn addr(&self, name: &str) -> std::result::Result<Address, ChainError> {
        let resolver = self.require_resolver(name).await?;
        let addr = PublicResolver::new(to_alloy(resolver), self.provider.clone())
            .addr(node(name)?)
            .call()
            .await
            .map_err(classify)?;
        Ok(from_alloy(addr))
    }

    async fn interface_implementer(
        &self,
        name: &str,
        interface_id: [u8; 4],
    ) -> std::result::Result<Address, ChainError> {
        let resolver = self.require_resolver(name).await?;
        let implementer = PublicResolver::new(to_alloy(resolver), self.provider.clone())
            .interfaceImplementer(node(name)?, FixedBytes::from(interface_id))
            .call()
            .await
            .map_err(classify)?;
        Ok(from_alloy(implementer))
    }

    async fn set_resolver(
        &self,
        name: &str,
        resolver: Address,
    ) -> std::result::Result<TxHash, ChainError> {
        let registry = self.registry();
        self.transact(
            "setResolver",
            registry.setResolver(node(name)?, to_alloy(resolver)),
        )
        .await
    }

    async fn apply(&self, name: &str, call: &SetterCall) -> std::result::Result<TxHash, ChainError> {
        // Rejected before any RPC, never remediated
        if let SetterCall::Generic { method, .. } = call {
            return Err(no_binding(method));
        }

        let resolver = to_alloy(self.require_resolver(name).await?);
        let node = node(name)?;
        let public = PublicResolver::new(resolver, self.provider.clone());

        match call {
            SetterCall::Addr { addr } => {
                self.transact("setAddr", public.setAddr(node, to_alloy(*addr)))
                    .await
            }
            SetterCall::Name { name } => {
                self.transact("setName", public.setName(node, name.clone()))
                    .await
            }
            SetterCall::Text { key, value } => {
                self.transact(
                    "setText",
                    public.setText(node, key.clone(), value.clone()),
                )
                .await
            }
            SetterCall::Content { hash } => {
                self.transact("setContent", public.setContent(node, B256::from(*hash)))
                    .await
            }
            SetterCall::Contenthash { hash } => {
                self.transact(
                    "setContenthash",
                    public.setContenthash(node, Bytes::from(hash.clone())),
                )
                .await
            }
            SetterCall::Pubkey { x, y } => {
                self.transact(
                    "setPubkey",
                    public.setPubkey(node, B256::from(*x), B256::from(*y)),
                )
                .await
            }
            SetterCall::Abi { content_type, data } => {
                self.transact(
                    "setABI",
                    public.setABI(node, U256::from(*content_type), Bytes::from(data.clone())),
                )
                .await
            }
            SetterCall::Interface {
                interface_id,
                implementer,
            } => {
                self.transact(
                    "setInterface",
                    public.setInterface(
                        node,
                        FixedBytes::from(*interface_id),
                        to_alloy(*implementer),
                    ),
                )
                .await
            }
            SetterCall::Dnsrr { data } => {
                let dns = DnsResolver::new(resolver, self.provider.clone());
                self.transact("setDnsrr", dns.setDnsrr(node, Bytes::from(data.clone())))
                    .await
            }
            SetterCall::Generic { method, .. } => Err(no_binding(method)),
        }
    }

    async fn claim_reverse(
        &self,
        registrar: Address,
        owner: Address,
    ) -> std::result::Result<TxHash, ChainError> {
        let registrar = ReverseRegistrar::new(to_alloy(registrar), self.provider.clone());
        self.transact("claim", registrar.claim(to_alloy(owner))).await
    }

    async fn register_test(
        &self,
        registrar: Address,
        label_hash: [u8; 32],
        owner: Address,
    ) -> std::result::Result<TxHash, ChainError> {
        let registrar = TestRegistrar::new(to_alloy(registrar), self.provider.clone());
        self.transact(
            "register",
            registrar.register(B256::from(label_hash), to_alloy(owner)),
        )
        .await
    }

    async fn register_eth(
        &self,
        controller: Address,
        label: &str,
        owner: Address,
        duration_secs: u64,
        secret: [u8; 32],
    ) -> std::result::Result<TxHash, ChainError> {
        let controller = EthRegistrarController::new(to_alloy(controller), self.provider.clone());
        self.transact(
            "register",
            controller.register(
                label.to_string(),
                to_alloy(owner),
                U256::from(duration_secs),
                B256::from(secret),
            ),
        )
        .await
    }

    async fn deploy_dns_resolver(&self) -> std::result::Result<Address, ChainError> {
        let bytecode = self.dns_resolver_bytecode.clone().ok_or_else(|| {
            ChainError::unsupported("DNS resolver bytecode is not configured")
        })?;

        let tx = TransactionRequest::default()
            .with_deploy_code(bytecode)
            .with_gas_limit(self.gas.deploy);

        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(classify)?
            .get_receipt()
            .await
            .map_err(classify)?;

        if !receipt.status() {
            return Err(ChainError::new(
                ChainErrorKind::Reverted,
                format!("DNS resolver deployment reverted in {}", receipt.transaction_hash),
            ));
        }

        receipt
            .contract_address
            .map(from_alloy)
            .ok_or_else(|| ChainError::transport("Deployment receipt has no contract address"))
    }

    async fn network_id(&self) -> std::result::Result<u64, ChainError> {
        self.provider.get_net_version().await.map_err(classify)
    }

    fn client_name(&self) -> &'static str {
        "alloy"
    }
}

/// Factory for connecting alloy ENS clients
#[derive(Debug, Clone, Default)]
pub struct AlloyClientFactory {
    dns_resolver_bytecode: Option<Bytes>,
}

impl AlloyClientFactory {
    /// Create a factory
    ///
    /// # Parameters
    ///
    /// - `dns_resolver_bytecode`: hex creation bytecode of the DNS resolver;
    ///   without it `deploy_dns_resolver` fails
    pub fn new(dns_resolver_bytecode: Option<&str>) -> Result<Self> {
        let dns_resolver_bytecode = dns_resolver_bytecode
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(|code| {
                alloy::hex::decode(code)
                    .map(Bytes::from)
                    .map_err(|e| Error::config(format!("Invalid DNS resolver bytecode: {}", e)))
            })
            .transpose()?;

        if dns_resolver_bytecode.is_none() {
            tracing::warn!("No DNS resolver bytecode configured; Dnsrr remediation will fail");
        }

        Ok(Self {
            dns_resolver_bytecode,
        })
    }
}

impl EnsClientFactory for AlloyClientFactory {
    fn connect(&self, params: &ClientParams) -> Result<Box<dyn EnsClient>> {
        if params.endpoint.is_empty() {
            return Err(Error::config("Endpoint is required"));
        }
        Ok(Box::new(AlloyEnsClient::connect(
            params,
            self.dns_resolver_bytecode.clone(),
        )?))
    }
}
