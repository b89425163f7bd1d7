// # Signer Resolution
//
// Resolves the key that signs every transaction of an invocation.
//
// ## Order
//
// 1. `PrivateKey` from the resource properties, if present
// 2. The persisted key in the secret store
// 3. A freshly generated key, persisted before use
//
// Secret store errors other than "not found" propagate unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::name::{REVERSE_SUFFIX, decode_hex, keccak256};
use crate::traits::SecretStore;

/// 20-byte Ethereum account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address (unset owner / resolver)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// EIP-55 mixed-case checksum encoding, `0x`-prefixed
    pub fn to_checksum(&self) -> String {
        alloy_primitives::Address::from(self.0).to_checksum(None)
    }

    /// Reverse record name of this address
    ///
    /// Uses the checksum spelling, e.g. `9cce34F7...41d6.addr.reverse`.
    pub fn reverse_name(&self) -> String {
        let checksum = self.to_checksum();
        format!("{}.{}", &checksum[2..], REVERSE_SUFFIX)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|v: Vec<u8>| {
            Error::invalid_input(format!("Address must be 20 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// secp256k1 private key used as transaction sender
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the key.
#[derive(Clone)]
pub struct SigningKey {
    inner: k256::ecdsa::SigningKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key", &"<REDACTED>")
            .field("address", &self.address())
            .finish()
    }
}

impl SigningKey {
    /// Parse a hex private key (`0x` prefix optional)
    pub fn from_hex(value: &str) -> Result<Self> {
        let bytes = decode_hex(value).map_err(|_| Error::invalid_input("Malformed private key"))?;
        if bytes.len() != 32 {
            return Err(Error::invalid_input(format!(
                "Private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let inner = k256::ecdsa::SigningKey::from_slice(&bytes)
            .map_err(|_| Error::invalid_input("Private key is not a valid secp256k1 scalar"))?;
        Ok(Self { inner })
    }

    /// Generate a new random key
    pub fn generate() -> Self {
        Self {
            inner: k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Raw 32-byte secret
    ///
    /// ⚠️ NEVER log this value
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// `0x`-prefixed hex secret, the format persisted in the secret store
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Account address derived from the public key
    pub fn address(&self) -> Address {
        let point = self.inner.verifying_key().to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }
}

/// Resolve the signing key for one invocation
///
/// # Parameters
///
/// - `explicit`: `PrivateKey` from the resource properties
/// - `store`: secret store holding the persisted key
/// - `secret_name`: name of the persisted key
pub async fn resolve_signing_key(
    explicit: Option<&str>,
    store: &dyn SecretStore,
    secret_name: &str,
) -> Result<SigningKey> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        debug!("Using private key from resource properties");
        return SigningKey::from_hex(key);
    }

    match store.get_secret(secret_name).await {
        Ok(value) => {
            debug!("Using private key from {} secret store", store.store_name());
            SigningKey::from_hex(&value)
        }
        Err(Error::SecretNotFound(_)) => {
            let key = SigningKey::generate();
            store.put_secret(secret_name, &key.to_hex()).await?;
            info!(
                "Generated new signer {} and persisted it as '{}'",
                key.address(),
                secret_name
            );
            Ok(key)
        }
        Err(e) => Err(e),
    }
}
