//! Core traits for the ENS handler
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`EnsClient`]: Read and write ENS contracts
//! - [`SecretStore`]: Persisted signer key
//! - [`Faucet`]: Test-network funding
//! - [`ResponseSink`]: CloudFormation response delivery

pub mod ens_client;
pub mod secret_store;
pub mod notify;

pub use ens_client::{
    ClientParams, ETH_CONTROLLER_INTERFACE_ID, EnsClient, EnsClientFactory, TxHash,
};
pub use secret_store::SecretStore;
pub use notify::{Faucet, ResponseSink};
