//! DNS resource record transcoding
//!
//! `Custom::Dnsrr` inputs are record sets in CloudFormation shape:
//!
//! ```json
//! { "Name": "www.example.", "Type": "A", "TTL": 300, "ResourceRecords": ["192.0.2.1"] }
//! ```
//!
//! `TTL` and an object-form MX `Preference` may also arrive as decimal
//! strings, which is how CloudFormation passes template scalars.
//!
//! Each record of each set is encoded in DNS wire format (RFC 1035 §4.1.3)
//! without label compression and with names in their original case, and the
//! results are concatenated into the single `bytes` argument of `setDnsrr`.

use std::net::{Ipv4Addr, Ipv6Addr};

use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, PTR, TXT};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::resource::numeric_value;

/// One record set of a `Custom::Dnsrr` request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecordSet {
    /// Owner name; the root `.` when absent
    #[serde(default)]
    pub name: Option<String>,

    /// Record type mnemonic (A, AAAA, CNAME, NS, PTR, TXT, MX)
    #[serde(rename = "Type")]
    pub record_type: String,

    /// A single rdata value or a list of them
    #[serde(default)]
    pub resource_records: Option<Value>,

    /// Time to live in seconds
    #[serde(rename = "TTL", default, deserialize_with = "ttl_from_number_or_string")]
    pub ttl: u32,
}

fn ttl_from_number_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    numeric_value(&value)
        .and_then(|ttl| u32::try_from(ttl).ok())
        .ok_or_else(|| serde::de::Error::custom(format!("TTL must be a 32-bit number, got {}", value)))
}

impl ResourceRecordSet {
    /// The rdata values as a list
    fn rdata_values(&self) -> Vec<Value> {
        match &self.resource_records {
            None => Vec::new(),
            Some(Value::Array(values)) => values.clone(),
            Some(value) => vec![value.clone()],
        }
    }

    /// Encode every record of this set
    pub fn encode(&self) -> Result<Vec<u8>> {
        let owner = parse_name(self.name.as_deref().unwrap_or("."))?;
        let mut out = Vec::new();

        for value in self.rdata_values() {
            let rdata = to_rdata(&self.record_type, &value)?;
            let record = Record::from_rdata(owner.clone(), self.ttl, rdata);
            out.extend(emit(&record)?);
        }

        Ok(out)
    }
}

/// Encode a list of record sets (already normalized from `Inputs`)
pub fn encode_record_sets(inputs: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for input in inputs {
        let set: ResourceRecordSet = serde_json::from_value(input.clone())
            .map_err(|e| Error::dns_encoding(format!("Invalid record set: {}", e)))?;
        out.extend(set.encode()?);
    }
    Ok(out)
}

fn emit(record: &Record) -> Result<Vec<u8>> {
    let rdata = match record.data() {
        Some(rdata) => emit_part(rdata)?,
        None => Vec::new(),
    };
    let rdlength = u16::try_from(rdata.len())
        .map_err(|_| Error::dns_encoding(format!("Rdata too long: {} bytes", rdata.len())))?;

    let mut out = emit_part(record.name())?;
    out.extend_from_slice(&u16::from(record.record_type()).to_be_bytes());
    out.extend_from_slice(&u16::from(record.dns_class()).to_be_bytes());
    out.extend_from_slice(&record.ttl().to_be_bytes());
    out.extend_from_slice(&rdlength.to_be_bytes());
    out.extend(rdata);
    Ok(out)
}

/// Encode one name or rdata on a fresh encoder, so no compression pointer
/// can refer to an earlier part
fn emit_part<T: BinEncodable>(part: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = BinEncoder::new(&mut buf);
    part.emit(&mut encoder)
        .map_err(|e| Error::dns_encoding(e.to_string()))?;
    Ok(buf)
}

fn parse_name(name: &str) -> Result<Name> {
    if name.is_empty() || name == "." {
        return Ok(Name::root());
    }
    let mut parsed = Name::from_ascii(name)
        .map_err(|e| Error::dns_encoding(format!("Invalid DNS name '{}': {}", name, e)))?;
    parsed.set_fqdn(true);
    Ok(parsed)
}

fn as_str<'a>(record_type: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Error::dns_encoding(format!("{} rdata must be a string, got {}", record_type, value))
    })
}

fn to_rdata(record_type: &str, value: &Value) -> Result<RData> {
    let rdata = match record_type.to_ascii_uppercase().as_str() {
        "A" => {
            let ip: Ipv4Addr = as_str(record_type, value)?
                .parse()
                .map_err(|e| Error::dns_encoding(format!("Invalid A rdata: {}", e)))?;
            RData::A(A::from(ip))
        }
        "AAAA" => {
            let ip: Ipv6Addr = as_str(record_type, value)?
                .parse()
                .map_err(|e| Error::dns_encoding(format!("Invalid AAAA rdata: {}", e)))?;
            RData::AAAA(AAAA::from(ip))
        }
        "CNAME" => RData::CNAME(CNAME(parse_name(as_str(record_type, value)?)?)),
        "NS" => RData::NS(NS(parse_name(as_str(record_type, value)?)?)),
        "PTR" => RData::PTR(PTR(parse_name(as_str(record_type, value)?)?)),
        "TXT" => RData::TXT(TXT::new(txt_strings(value)?)),
        "MX" => {
            let (preference, exchange) = mx_parts(value)?;
            RData::MX(MX::new(preference, parse_name(&exchange)?))
        }
        other => {
            return Err(Error::dns_encoding(format!(
                "Unsupported record type: {}",
                other
            )));
        }
    };
    Ok(rdata)
}

fn txt_strings(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(parts) => parts
            .iter()
            .map(|part| as_str("TXT", part).map(str::to_string))
            .collect(),
        other => Err(Error::dns_encoding(format!("Invalid TXT rdata: {}", other))),
    }
}

/// MX rdata as `{"Preference": 10, "Exchange": "mx.example."}` or `"10 mx.example."`
fn mx_parts(value: &Value) -> Result<(u16, String)> {
    match value {
        Value::Object(map) => {
            let preference = map
                .get("Preference")
                .or_else(|| map.get("preference"))
                .and_then(numeric_value)
                .and_then(|p| u16::try_from(p).ok())
                .ok_or_else(|| Error::dns_encoding("MX rdata needs a 16-bit Preference"))?;
            let exchange = map
                .get("Exchange")
                .or_else(|| map.get("exchange"))
                .and_then(Value::as_str)
                .ok_or_else(|| Error::dns_encoding("MX rdata needs an Exchange"))?;
            Ok((preference, exchange.to_string()))
        }
        Value::String(s) => {
            let (preference, exchange) = s
                .trim()
                .split_once(char::is_whitespace)
                .ok_or_else(|| Error::dns_encoding(format!("Invalid MX rdata: {}", s)))?;
            let preference = preference
                .parse::<u16>()
                .map_err(|e| Error::dns_encoding(format!("Invalid MX preference: {}", e)))?;
            Ok((preference, exchange.trim().to_string()))
        }
        other => Err(Error::dns_encoding(format!("Invalid MX rdata: {}", other))),
    }
}
