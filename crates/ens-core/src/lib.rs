// # ens-core
//
// Core library for the ENS CloudFormation custom-resource handler.
//
// ## Architecture Overview
//
// This library provides the decision logic for provisioning ENS records:
// - **EnsClient**: Trait for reading and writing the ENS contracts
// - **SecretStore**: Trait for the persisted signer key
// - **Faucet** / **ResponseSink**: Traits for the outbound HTTP calls
// - **Reconciler**: Apply → remediate → retry state machine
// - **CustomResourceHandler**: One CloudFormation event in, one response out
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Chain, secret and HTTP access live behind traits
// 2. **Closed Dispatch**: Resource kinds map to typed setter calls
// 3. **Library-First**: The Lambda binary only wires implementations together
// 4. **Bounded Remediation**: At most one remediation pass and one retry

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod name;
pub mod reconciler;
pub mod resource;
pub mod secrets;
pub mod signer;
pub mod traits;

// Re-export core types for convenience
pub use config::{FaucetConfig, GasConfig, HandlerConfig, TimeoutConfig};
pub use error::{ChainError, ChainErrorKind, Error, Result};
pub use event::{CustomResourceEvent, CustomResourceResponse, ResponseStatus};
pub use handler::CustomResourceHandler;
pub use reconciler::{ReconcileOutcome, ReconcileRequest, Reconciler, Remediation};
pub use resource::{ResourceKind, SetterCall};
pub use secrets::MemorySecretStore;
pub use signer::{Address, SigningKey};
pub use traits::{EnsClient, EnsClientFactory, Faucet, ResponseSink, SecretStore, TxHash};
