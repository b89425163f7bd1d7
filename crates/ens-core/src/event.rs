//! CloudFormation custom-resource request and response payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle action requested by CloudFormation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Properties of an ENS custom resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    /// JSON-RPC endpoint of the Ethereum node
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Hex private key of the signer
    #[serde(default)]
    pub private_key: Option<String>,

    /// Target ENS name
    #[serde(default)]
    pub name: Option<String>,

    /// Setter inputs, a single value or a list
    #[serde(default)]
    pub inputs: Option<Value>,
}

/// Inbound custom-resource event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,

    /// `Custom::<Kind>`
    pub resource_type: String,

    #[serde(default)]
    pub resource_properties: ResourceProperties,

    pub request_id: String,
    pub stack_id: String,
    pub logical_resource_id: String,

    /// Pre-signed URL the response is PUT to
    #[serde(rename = "ResponseURL")]
    pub response_url: String,

    /// Present on Update and Delete
    #[serde(default)]
    pub physical_resource_id: Option<String>,
}

/// Outcome reported to CloudFormation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// `Data` attributes of a successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseData {
    pub name: String,
    /// Namehash as hex without `0x`
    pub namehash: String,
}

/// Payload PUT to the response URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<ResponseData>,
    pub request_id: String,
    pub stack_id: String,
    pub logical_resource_id: String,
    pub physical_resource_id: String,
}

impl CustomResourceResponse {
    /// Successful response carrying the name and its namehash
    pub fn success(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
        data: Option<ResponseData>,
    ) -> Self {
        Self {
            status: ResponseStatus::Success,
            reason: reason.into(),
            data,
            request_id: event.request_id.clone(),
            stack_id: event.stack_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            physical_resource_id: physical_resource_id.into(),
        }
    }

    /// Failed response; failures never carry data
    pub fn failed(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status: ResponseStatus::Failed,
            reason: reason.into(),
            data: None,
            request_id: event.request_id.clone(),
            stack_id: event.stack_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            physical_resource_id: physical_resource_id.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Physical id to report: the one CloudFormation already knows, else the log stream
pub fn physical_resource_id(event: &CustomResourceEvent, log_stream: &str) -> String {
    event
        .physical_resource_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| log_stream.to_string())
}
