//! Configuration types for the ENS handler
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::signer::Address;

/// Main handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// JSON-RPC endpoint used when the request carries no `Endpoint`
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,

    /// ENS registry contract address
    #[serde(default = "default_registry_address")]
    pub registry_address: Address,

    /// Name of the persisted private key in the secret store
    #[serde(default = "default_secret_name")]
    pub secret_name: String,

    /// Registration period for `.eth` names (in seconds)
    #[serde(default = "default_registration_duration_secs")]
    pub registration_duration_secs: u64,

    /// Gas limits for transactions
    #[serde(default)]
    pub gas: GasConfig,

    /// Test-network faucet settings
    #[serde(default)]
    pub faucet: FaucetConfig,

    /// Per-call timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl HandlerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            default_endpoint: default_endpoint(),
            registry_address: default_registry_address(),
            secret_name: default_secret_name(),
            registration_duration_secs: default_registration_duration_secs(),
            gas: GasConfig::default(),
            faucet: FaucetConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.default_endpoint.is_empty() {
            return Err(crate::Error::config("Default endpoint cannot be empty"));
        }
        if self.registry_address.is_zero() {
            return Err(crate::Error::config("Registry address cannot be zero"));
        }
        if self.secret_name.is_empty() {
            return Err(crate::Error::config("Secret name cannot be empty"));
        }
        if self.registration_duration_secs == 0 {
            return Err(crate::Error::config("Registration duration must be > 0"));
        }

        self.gas.validate()?;
        self.faucet.validate()?;
        self.timeouts.validate()?;

        Ok(())
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Gas limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    /// Gas for setters, registrations, claims and `setResolver`
    #[serde(default = "default_setter_gas")]
    pub setter: u64,

    /// Gas for contract deployment
    #[serde(default = "default_deploy_gas")]
    pub deploy: u64,
}

impl GasConfig {
    /// Validate the gas limits
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.setter == 0 || self.deploy == 0 {
            return Err(crate::Error::config("Gas limits must be > 0"));
        }
        Ok(())
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            setter: default_setter_gas(),
            deploy: default_deploy_gas(),
        }
    }
}

/// Faucet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetConfig {
    /// Base URL; the signer address is appended
    #[serde(default = "default_faucet_url")]
    pub url: String,

    /// Network id on which the faucet is used
    #[serde(default = "default_faucet_network_id")]
    pub network_id: u64,
}

impl FaucetConfig {
    /// Validate the faucet configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Faucet URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        Ok(())
    }

    /// Funding URL for an address
    pub fn url_for(&self, address: &Address) -> String {
        format!("{}{}", self.url, address.to_checksum())
    }
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            url: default_faucet_url(),
            network_id: default_faucet_network_id(),
        }
    }
}

/// Timeouts applied to every outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout for one chain read or one transaction round-trip (seconds)
    #[serde(default = "default_chain_call_secs")]
    pub chain_call_secs: u64,

    /// Timeout for faucet and callback HTTP requests (seconds)
    #[serde(default = "default_http_secs")]
    pub http_secs: u64,
}

impl TimeoutConfig {
    /// Validate the timeouts
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.chain_call_secs == 0 || self.http_secs == 0 {
            return Err(crate::Error::config("Timeouts must be > 0"));
        }
        Ok(())
    }

    /// Chain call timeout as a Duration
    pub fn chain_call(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.chain_call_secs)
    }

    /// HTTP timeout as a Duration
    pub fn http(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            chain_call_secs: default_chain_call_secs(),
            http_secs: default_http_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://mainnet.infura.io".to_string()
}

fn default_registry_address() -> Address {
    Address::new([
        0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x2e, 0x07, 0x4e, 0xc6, 0x9a, 0x0b, 0xfb, 0x29, 0x30,
        0xda, 0x7a, 0x1e, 0x4d, 0x8a,
    ])
}

fn default_secret_name() -> String {
    "privateKey".to_string()
}

fn default_registration_duration_secs() -> u64 {
    365 * 24 * 60 * 60
}

fn default_setter_gas() -> u64 {
    100_000
}

fn default_deploy_gas() -> u64 {
    6_000_000
}

fn default_faucet_url() -> String {
    "https://faucet.ropsten.be/donate/".to_string()
}

fn default_faucet_network_id() -> u64 {
    3
}

fn default_chain_call_secs() -> u64 {
    60
}

fn default_http_secs() -> u64 {
    30
}
