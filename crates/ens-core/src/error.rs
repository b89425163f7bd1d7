//! Error types for the ENS custom-resource handler
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for handler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a blockchain client failure
///
/// The reconciler branches on the kind only, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainErrorKind {
    /// The name has no resolver set (unregistered or unconfigured)
    NameNotFound,
    /// The signer cannot pay for gas
    InsufficientFunds,
    /// The transaction or call was reverted by the contract
    Reverted,
    /// RPC transport or node-side failure
    Transport,
    /// The client cannot perform the requested operation
    Unsupported,
}

impl std::fmt::Display for ChainErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChainErrorKind::NameNotFound => "name not found",
            ChainErrorKind::InsufficientFunds => "insufficient funds",
            ChainErrorKind::Reverted => "reverted",
            ChainErrorKind::Transport => "transport",
            ChainErrorKind::Unsupported => "unsupported",
        };
        f.write_str(label)
    }
}

/// Error returned by an [`EnsClient`](crate::traits::EnsClient)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ChainError {
    kind: ChainErrorKind,
    message: String,
}

impl ChainError {
    /// Create a chain error of the given kind
    pub fn new(kind: ChainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The name has no resolver
    pub fn name_not_found(name: impl AsRef<str>) -> Self {
        Self::new(
            ChainErrorKind::NameNotFound,
            format!("ENS name not found: {}", name.as_ref()),
        )
    }

    /// The signer cannot pay for gas
    pub fn insufficient_funds(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::InsufficientFunds, message)
    }

    /// Transport-level failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Transport, message)
    }

    /// Unsupported operation
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Unsupported, message)
    }

    /// Error classification
    pub fn kind(&self) -> ChainErrorKind {
        self.kind
    }

    /// Diagnostic message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Core error type for the handler
#[derive(Error, Debug)]
pub enum Error {
    /// Blockchain client errors
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// The secret store has no value under this name
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// Secret store errors other than "not found"
    #[error("Secret store error: {0}")]
    SecretStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request input (resource properties, names, keys)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// DNS record transcoding errors
    #[error("DNS encoding error: {0}")]
    DnsEncoding(String),

    /// Names whose parent is neither `test` nor `eth` would need the DNS-import
    /// registrar, which has no implementation
    #[error("DNS-import registration is not implemented (name: {0})")]
    DnsImportUnsupported(String),

    /// Faucet request failed or returned a non-2xx status
    #[error("Faucet error: {0}")]
    Faucet(String),

    /// Response delivery to the callback URL failed
    #[error("Callback error: {0}")]
    Callback(String),

    /// A network step exceeded its timeout
    #[error("Timed out: {0}")]
    Timeout(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a secret-not-found error
    pub fn secret_not_found(name: impl Into<String>) -> Self {
        Self::SecretNotFound(name.into())
    }

    /// Create a secret store error
    pub fn secret_store(msg: impl Into<String>) -> Self {
        Self::SecretStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a DNS encoding error
    pub fn dns_encoding(msg: impl Into<String>) -> Self {
        Self::DnsEncoding(msg.into())
    }

    /// Create a faucet error
    pub fn faucet(msg: impl Into<String>) -> Self {
        Self::Faucet(msg.into())
    }

    /// Create a callback delivery error
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Chain error kind, if this is a chain error
    pub fn chain_kind(&self) -> Option<ChainErrorKind> {
        match self {
            Error::Chain(err) => Some(err.kind()),
            _ => None,
        }
    }
}
