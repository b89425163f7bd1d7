//! Resource kinds and setter dispatch
//!
//! A CloudFormation `ResourceType` of `Custom::<Kind>` selects the resolver
//! setter `set<Kind>`. The mapping is a closed enum: known kinds get typed
//! arguments, anything else travels as [`SetterCall::Generic`].
//!
//! CloudFormation passes every scalar property as a string, so numeric
//! arguments accept either a JSON number or a decimal string.

pub mod dnsrr;

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::name::decode_hex;
use crate::signer::Address;

pub use dnsrr::{ResourceRecordSet, encode_record_sets};

const RESOURCE_TYPE_PREFIX: &str = "Custom::";

/// Resource kind parsed from a `Custom::*` resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Addr,
    Name,
    Text,
    Content,
    Contenthash,
    Pubkey,
    Dnsrr,
    /// `Custom::ABI`
    Abi,
    Interface,
    /// Any other kind, dispatched to `set<Kind>` untyped
    Other(String),
}

impl ResourceKind {
    /// Parse `Custom::Addr` and friends
    pub fn from_resource_type(resource_type: &str) -> Result<Self> {
        let kind = resource_type
            .strip_prefix(RESOURCE_TYPE_PREFIX)
            .filter(|kind| !kind.is_empty())
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "Resource type must look like Custom::<Kind>, got '{}'",
                    resource_type
                ))
            })?;

        Ok(match kind {
            "Addr" => ResourceKind::Addr,
            "Name" => ResourceKind::Name,
            "Text" => ResourceKind::Text,
            "Content" => ResourceKind::Content,
            "Contenthash" => ResourceKind::Contenthash,
            "Pubkey" => ResourceKind::Pubkey,
            "Dnsrr" => ResourceKind::Dnsrr,
            "ABI" => ResourceKind::Abi,
            "Interface" => ResourceKind::Interface,
            other => ResourceKind::Other(other.to_string()),
        })
    }

    /// Whether this kind writes DNS records (and so needs a DNS resolver)
    pub fn is_dns(&self) -> bool {
        matches!(self, ResourceKind::Dnsrr)
    }

    /// Name of the resolver setter for this kind
    pub fn setter_name(&self) -> String {
        format!("set{}", self)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Addr => f.write_str("Addr"),
            ResourceKind::Name => f.write_str("Name"),
            ResourceKind::Text => f.write_str("Text"),
            ResourceKind::Content => f.write_str("Content"),
            ResourceKind::Contenthash => f.write_str("Contenthash"),
            ResourceKind::Pubkey => f.write_str("Pubkey"),
            ResourceKind::Dnsrr => f.write_str("Dnsrr"),
            ResourceKind::Abi => f.write_str("ABI"),
            ResourceKind::Interface => f.write_str("Interface"),
            ResourceKind::Other(kind) => f.write_str(kind),
        }
    }
}

/// A resolver setter invocation with its arguments (the node is implied)
#[derive(Debug, Clone, PartialEq)]
pub enum SetterCall {
    /// `setAddr(node, addr)`
    Addr { addr: Address },
    /// `setName(node, name)`
    Name { name: String },
    /// `setText(node, key, value)`
    Text { key: String, value: String },
    /// `setContent(node, hash)`
    Content { hash: [u8; 32] },
    /// `setContenthash(node, hash)`
    Contenthash { hash: Vec<u8> },
    /// `setPubkey(node, x, y)`
    Pubkey { x: [u8; 32], y: [u8; 32] },
    /// `setDnsrr(node, data)` with concatenated wire-format records
    Dnsrr { data: Vec<u8> },
    /// `setABI(node, contentType, data)`
    Abi { content_type: u64, data: Vec<u8> },
    /// `setInterface(node, interfaceID, implementer)`
    Interface {
        interface_id: [u8; 4],
        implementer: Address,
    },
    /// Any other setter, arguments passed through
    Generic { method: String, inputs: Vec<Value> },
}

impl SetterCall {
    /// Setter method name
    pub fn method(&self) -> String {
        match self {
            SetterCall::Addr { .. } => "setAddr".to_string(),
            SetterCall::Name { .. } => "setName".to_string(),
            SetterCall::Text { .. } => "setText".to_string(),
            SetterCall::Content { .. } => "setContent".to_string(),
            SetterCall::Contenthash { .. } => "setContenthash".to_string(),
            SetterCall::Pubkey { .. } => "setPubkey".to_string(),
            SetterCall::Dnsrr { .. } => "setDnsrr".to_string(),
            SetterCall::Abi { .. } => "setABI".to_string(),
            SetterCall::Interface { .. } => "setInterface".to_string(),
            SetterCall::Generic { method, .. } => method.clone(),
        }
    }
}

/// Turn the `Inputs` property into an argument list
///
/// A missing value is an empty list, a scalar is a one-element list.
pub fn normalize_inputs(inputs: Option<Value>) -> Vec<Value> {
    match inputs {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values,
        Some(value) => vec![value],
    }
}

/// Build the setter call for `kind` from normalized inputs
pub fn dispatch(kind: &ResourceKind, inputs: Vec<Value>) -> Result<SetterCall> {
    let call = match kind {
        ResourceKind::Addr => {
            let addr = string_arg(kind, &inputs, 0)?
                .parse::<Address>()
                .map_err(|e| Error::invalid_input(format!("Addr input: {}", e)))?;
            SetterCall::Addr { addr }
        }
        ResourceKind::Name => SetterCall::Name {
            name: string_arg(kind, &inputs, 0)?.to_string(),
        },
        ResourceKind::Text => SetterCall::Text {
            key: string_arg(kind, &inputs, 0)?.to_string(),
            value: string_arg(kind, &inputs, 1)?.to_string(),
        },
        ResourceKind::Content => SetterCall::Content {
            hash: bytes32_arg(kind, &inputs, 0)?,
        },
        ResourceKind::Contenthash => SetterCall::Contenthash {
            hash: decode_hex(string_arg(kind, &inputs, 0)?)?,
        },
        ResourceKind::Pubkey => SetterCall::Pubkey {
            x: bytes32_arg(kind, &inputs, 0)?,
            y: bytes32_arg(kind, &inputs, 1)?,
        },
        ResourceKind::Dnsrr => SetterCall::Dnsrr {
            data: encode_record_sets(&inputs)?,
        },
        ResourceKind::Abi => {
            let content_type = inputs
                .first()
                .and_then(numeric_value)
                .ok_or_else(|| {
                    Error::invalid_input("setABI expects a numeric content type at position 0")
                })?;
            // Content types are single bits (1 JSON, 2 zlib JSON, 4 CBOR, 8 URI)
            if !content_type.is_power_of_two() {
                return Err(Error::invalid_input(format!(
                    "setABI content type must be a power of two, got {}",
                    content_type
                )));
            }
            SetterCall::Abi {
                content_type,
                data: decode_hex(string_arg(kind, &inputs, 1)?)?,
            }
        }
        ResourceKind::Interface => {
            let id = decode_hex(string_arg(kind, &inputs, 0)?)?;
            let interface_id = <[u8; 4]>::try_from(id.as_slice()).map_err(|_| {
                Error::invalid_input(format!(
                    "setInterface expects a 4-byte interface id, got {} bytes",
                    id.len()
                ))
            })?;
            let implementer = string_arg(kind, &inputs, 1)?
                .parse::<Address>()
                .map_err(|e| Error::invalid_input(format!("Interface implementer: {}", e)))?;
            SetterCall::Interface {
                interface_id,
                implementer,
            }
        }
        ResourceKind::Other(_) => SetterCall::Generic {
            method: kind.setter_name(),
            inputs,
        },
    };
    Ok(call)
}

/// A JSON number or a decimal string as `u64`
pub(crate) fn numeric_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_arg<'a>(kind: &ResourceKind, inputs: &'a [Value], index: usize) -> Result<&'a str> {
    inputs.get(index).and_then(Value::as_str).ok_or_else(|| {
        Error::invalid_input(format!(
            "{} expects a string input at position {}",
            kind.setter_name(),
            index
        ))
    })
}

fn bytes32_arg(kind: &ResourceKind, inputs: &[Value], index: usize) -> Result<[u8; 32]> {
    let bytes = decode_hex(string_arg(kind, inputs, index)?)?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        Error::invalid_input(format!(
            "{} expects 32 bytes at position {}, got {}",
            kind.setter_name(),
            index,
            bytes.len()
        ))
    })
}
