//! Test doubles and common utilities for contract tests
//!
//! The doubles record every call so tests can assert on the exact chain
//! traffic a request produced, without a node.

#![allow(dead_code)]

use async_trait::async_trait;
use ens_core::error::{ChainError, Error, Result};
use ens_core::event::{CustomResourceEvent, CustomResourceResponse};
use ens_core::resource::SetterCall;
use ens_core::traits::{
    ClientParams, EnsClient, EnsClientFactory, Faucet, ResponseSink, SecretStore, TxHash,
};
use ens_core::{Address, HandlerConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Private key whose address is [`SIGNER`] (keccak256 of the empty string)
pub const SIGNER_KEY: &str = "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

/// Address of [`SIGNER_KEY`]
pub const SIGNER: &str = "0x9cce34F7aB185c7ABA1b7C8140d620B4BDA941d6";

/// Reverse name of [`SIGNER`]
pub const SIGNER_REVERSE: &str = "9cce34F7aB185c7ABA1b7C8140d620B4BDA941d6.addr.reverse";

pub const PUBLIC_RESOLVER: &str = "0x4976fb03C32e5B8cfe2b6cCB31c09Ba78EBaBa41";
pub const TEST_REGISTRAR: &str = "0x21397c1A1F4aCD9132fE36Df011610564b87E24b";
pub const REVERSE_REGISTRAR: &str = "0x6F628b68b30Dc3c17f345c9dbBb1E483c2b7aE5c";
pub const ETH_CONTROLLER: &str = "0x283Af0B28c62C092C9727F1Ee09c02CA627EB7F5";
pub const DEPLOYED_RESOLVER: &str = "0x1111111111111111111111111111111111111111";

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

pub fn signer() -> Address {
    addr(SIGNER)
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

/// Recording EnsClient backed by in-memory registry state
///
/// `apply` fails with `NameNotFound` while the name has no resolver, like a
/// real client. Errors pushed with [`MockEnsClient::fail_apply_with`] are
/// returned first, one per call.
#[derive(Clone)]
pub struct MockEnsClient {
    calls: Arc<Mutex<Vec<String>>>,
    owners: Arc<Mutex<HashMap<String, Address>>>,
    resolvers: Arc<Mutex<HashMap<String, Address>>>,
    apply_errors: Arc<Mutex<VecDeque<ChainError>>>,
    network_id: u64,
    hang_on_apply: bool,
}

impl MockEnsClient {
    /// A mainnet-like registry with the well-known contracts in place
    pub fn new() -> Self {
        let client = Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            owners: Arc::new(Mutex::new(HashMap::new())),
            resolvers: Arc::new(Mutex::new(HashMap::new())),
            apply_errors: Arc::new(Mutex::new(VecDeque::new())),
            network_id: 1,
            hang_on_apply: false,
        };
        client.set_owner("test", addr(TEST_REGISTRAR));
        client.set_owner("addr.reverse", addr(REVERSE_REGISTRAR));
        client.preset_resolver("resolver.eth", addr(PUBLIC_RESOLVER));
        client.preset_resolver("eth", addr(PUBLIC_RESOLVER));
        client
    }

    pub fn on_network(mut self, network_id: u64) -> Self {
        self.network_id = network_id;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang_on_apply = true;
        self
    }

    pub fn set_owner(&self, name: &str, owner: Address) {
        self.owners.lock().unwrap().insert(key(name), owner);
    }

    pub fn preset_resolver(&self, name: &str, resolver: Address) {
        self.resolvers.lock().unwrap().insert(key(name), resolver);
    }

    pub fn resolver_of(&self, name: &str) -> Option<Address> {
        self.resolvers.lock().unwrap().get(&key(name)).copied()
    }

    pub fn fail_apply_with(&self, err: ChainError) {
        self.apply_errors.lock().unwrap().push_back(err);
    }

    /// Every call in order, e.g. `owner:foo.test`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the calls that would send a transaction
    pub fn writes(&self) -> Vec<String> {
        const WRITES: [&str; 6] = [
            "apply:",
            "setResolver:",
            "claim:",
            "registerTest:",
            "registerEth:",
            "deploy",
        ];
        self.calls()
            .into_iter()
            .filter(|c| WRITES.iter().any(|w| c.starts_with(w)))
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn tx(&self) -> TxHash {
        let mut hash = [0u8; 32];
        hash[31] = self.calls.lock().unwrap().len() as u8;
        TxHash(hash)
    }
}

#[async_trait]
impl EnsClient for MockEnsClient {
    async fn owner(&self, name: &str) -> std::result::Result<Address, ChainError> {
        self.record(format!("owner:{}", name));
        Ok(self
            .owners
            .lock()
            .unwrap()
            .get(&key(name))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn resolver(&self, name: &str) -> std::result::Result<Option<Address>, ChainError> {
        self.record(format!("resolver:{}", name));
        Ok(self.resolver_of(name))
    }

    async fn addr(&self, name: &str) -> std::result::Result<Address, ChainError> {
        self.record(format!("addr:{}", name));
        match self.resolver_of(name) {
            Some(resolver) => Ok(resolver),
            None => Err(ChainError::name_not_found(name)),
        }
    }

    async fn interface_implementer(
        &self,
        name: &str,
        interface_id: [u8; 4],
    ) -> std::result::Result<Address, ChainError> {
        self.record(format!("interfaceImplementer:{}", name));
        assert_eq!(interface_id, [0x01, 0x8f, 0xac, 0x06]);
        Ok(addr(ETH_CONTROLLER))
    }

    async fn set_resolver(
        &self,
        name: &str,
        resolver: Address,
    ) -> std::result::Result<TxHash, ChainError> {
        self.record(format!("setResolver:{}:{:?}", name, resolver));
        self.preset_resolver(name, resolver);
        Ok(self.tx())
    }

    async fn apply(&self, name: &str, call: &SetterCall) -> std::result::Result<TxHash, ChainError> {
        self.record(format!("apply:{}:{}", call.method(), name));
        if self.hang_on_apply {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.apply_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        if self.resolver_of(name).is_none() {
            return Err(ChainError::name_not_found(name));
        }
        Ok(self.tx())
    }

    async fn claim_reverse(
        &self,
        registrar: Address,
        owner: Address,
    ) -> std::result::Result<TxHash, ChainError> {
        self.record(format!("claim:{:?}", registrar));
        self.set_owner(&owner.reverse_name(), owner);
        Ok(self.tx())
    }

    async fn register_test(
        &self,
        registrar: Address,
        _label_hash: [u8; 32],
        _owner: Address,
    ) -> std::result::Result<TxHash, ChainError> {
        self.record(format!("registerTest:{:?}", registrar));
        Ok(self.tx())
    }

    async fn register_eth(
        &self,
        controller: Address,
        label: &str,
        _owner: Address,
        duration_secs: u64,
        _secret: [u8; 32],
    ) -> std::result::Result<TxHash, ChainError> {
        self.record(format!("registerEth:{:?}:{}:{}", controller, label, duration_secs));
        Ok(self.tx())
    }

    async fn deploy_dns_resolver(&self) -> std::result::Result<Address, ChainError> {
        self.record("deploy".to_string());
        Ok(addr(DEPLOYED_RESOLVER))
    }

    async fn network_id(&self) -> std::result::Result<u64, ChainError> {
        self.record("networkId".to_string());
        Ok(self.network_id)
    }

    fn client_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out clones of one MockEnsClient
pub struct MockClientFactory {
    client: MockEnsClient,
    endpoints: Arc<Mutex<Vec<String>>>,
}

impl MockClientFactory {
    pub fn new(client: MockEnsClient) -> (Self, Arc<Mutex<Vec<String>>>) {
        let endpoints = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                client,
                endpoints: Arc::clone(&endpoints),
            },
            endpoints,
        )
    }
}

impl EnsClientFactory for MockClientFactory {
    fn connect(&self, params: &ClientParams) -> Result<Box<dyn EnsClient>> {
        self.endpoints.lock().unwrap().push(params.endpoint.clone());
        Ok(Box::new(self.client.clone()))
    }
}

/// Faucet counting its requests
#[derive(Clone, Default)]
pub struct CountingFaucet {
    requests: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingFaucet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Faucet for CountingFaucet {
    async fn request_funds(&self, address: &Address) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::faucet(format!("HTTP 503 for {:?}", address)));
        }
        Ok(())
    }
}

/// Response sink recording every delivery
#[derive(Clone, Default)]
pub struct RecordingResponder {
    delivered: Arc<Mutex<Vec<(String, CustomResourceResponse)>>>,
    fail: bool,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<(String, CustomResourceResponse)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseSink for RecordingResponder {
    async fn deliver(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((response_url.to_string(), response.clone()));
        if self.fail {
            return Err(Error::callback("HTTP 403 Forbidden"));
        }
        Ok(())
    }
}

/// Secret store whose reads always fail with a non-"not found" error
pub struct BrokenSecretStore {
    puts: Arc<AtomicUsize>,
}

impl BrokenSecretStore {
    pub fn new() -> Self {
        Self {
            puts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for BrokenSecretStore {
    async fn get_secret(&self, _name: &str) -> Result<String> {
        Err(Error::secret_store("AccessDeniedException"))
    }

    async fn put_secret(&self, _name: &str, _value: &str) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "broken"
    }
}

/// Configuration with short timeouts for tests
pub fn test_config() -> HandlerConfig {
    let mut config = HandlerConfig::default();
    config.timeouts.chain_call_secs = 1;
    config.timeouts.http_secs = 1;
    config
}

/// Build a custom-resource event
pub fn event(request_type: &str, resource_type: &str, properties: serde_json::Value) -> CustomResourceEvent {
    serde_json::from_value(serde_json::json!({
        "RequestType": request_type,
        "ResourceType": resource_type,
        "ResourceProperties": properties,
        "RequestId": "b3c4d5e6-0000-4000-8000-000000000001",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/ens/1",
        "LogicalResourceId": "EnsRecord",
        "ResponseURL": "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/put"
    }))
    .unwrap()
}
