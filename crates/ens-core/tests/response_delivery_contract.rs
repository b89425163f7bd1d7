//! Contract Test: Response Delivery
//!
//! Every invocation produces exactly one response, PUT to the event's
//! `ResponseURL`, carrying the event's correlation ids.
//!
//! Constraints verified:
//! - Failures are reported as FAILED with the error text and no Data
//! - Delete requests succeed without touching the chain
//! - A failed delivery fails the invocation
//! - The physical id is the existing one, else the log stream

mod common;

use common::*;
use ens_core::error::Error;
use ens_core::{CustomResourceHandler, HandlerConfig, MemorySecretStore, ResponseStatus};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

struct Harness {
    handler: CustomResourceHandler,
    client: MockEnsClient,
    responder: RecordingResponder,
    endpoints: Arc<Mutex<Vec<String>>>,
}

fn harness_with(responder: RecordingResponder, config: HandlerConfig) -> Harness {
    let client = MockEnsClient::new();
    client.preset_resolver("foo.test", addr(PUBLIC_RESOLVER));
    let (factory, endpoints) = MockClientFactory::new(client.clone());
    let handler = CustomResourceHandler::new(
        Arc::new(MemorySecretStore::new()),
        Box::new(factory),
        Arc::new(CountingFaucet::new()),
        Arc::new(responder.clone()),
        config,
    )
    .unwrap();
    Harness {
        handler,
        client,
        responder,
        endpoints,
    }
}

fn harness() -> Harness {
    harness_with(RecordingResponder::new(), test_config())
}

#[tokio::test]
async fn success_echoes_correlation_ids() {
    let h = harness();
    let event = event(
        "Create",
        "Custom::Text",
        json!({"PrivateKey": SIGNER_KEY, "Name": "foo.test", "Inputs": ["url", "https://example.com"]}),
    );

    let response = assert_ok!(h.handler.handle(&event, "log-stream-1").await);

    let delivered = h.responder.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, event.response_url);
    assert_eq!(delivered[0].1, response);
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.request_id, event.request_id);
    assert_eq!(response.stack_id, event.stack_id);
    assert_eq!(response.logical_resource_id, "EnsRecord");
    assert_eq!(response.physical_resource_id, "log-stream-1");
    assert!(response.reason.starts_with("0x"));
    assert_eq!(h.client.writes(), vec!["apply:setText:foo.test"]);
}

#[tokio::test]
async fn failure_is_reported_without_data() {
    let h = harness();
    let event = event(
        "Create",
        "Custom::Addr",
        json!({"PrivateKey": SIGNER_KEY, "Name": "example.com", "Inputs": SIGNER}),
    );

    let response = assert_ok!(h.handler.handle(&event, "stream").await);

    assert_eq!(response.status, ResponseStatus::Failed);
    assert!(response.data.is_none());
    assert!(response.reason.contains("example.com"));
    assert_eq!(h.responder.delivered().len(), 1);
}

#[tokio::test]
async fn malformed_resource_type_is_reported() {
    let h = harness();
    let event = event("Create", "AWS::S3::Bucket", json!({"PrivateKey": SIGNER_KEY}));

    let response = assert_ok!(h.handler.handle(&event, "stream").await);

    assert_eq!(response.status, ResponseStatus::Failed);
    assert!(h.client.calls().is_empty());
}

#[tokio::test]
async fn delete_succeeds_without_chain_calls() {
    let h = harness();
    let mut event = event(
        "Delete",
        "Custom::Addr",
        json!({"PrivateKey": SIGNER_KEY, "Name": "foo.test", "Inputs": SIGNER}),
    );
    event.physical_resource_id = Some("original-stream".to_string());

    let response = assert_ok!(h.handler.handle(&event, "new-stream").await);

    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.physical_resource_id, "original-stream");
    assert!(h.client.calls().is_empty());
    assert!(h.endpoints.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_delivery_fails_the_invocation() {
    let h = harness_with(RecordingResponder::failing(), test_config());
    let event = event(
        "Create",
        "Custom::Addr",
        json!({"PrivateKey": SIGNER_KEY, "Name": "foo.test", "Inputs": SIGNER}),
    );

    let err = assert_err!(h.handler.handle(&event, "stream").await);

    assert!(matches!(err, Error::Callback(_)));
    assert_eq!(h.responder.delivered().len(), 1);
}

#[tokio::test]
async fn endpoint_defaults_to_configuration() {
    let mut config = test_config();
    config.default_endpoint = "http://localhost:8545".to_string();
    let h = harness_with(RecordingResponder::new(), config);

    let without = event(
        "Create",
        "Custom::Addr",
        json!({"PrivateKey": SIGNER_KEY, "Name": "foo.test", "Inputs": SIGNER}),
    );
    let with = event(
        "Update",
        "Custom::Addr",
        json!({
            "PrivateKey": SIGNER_KEY,
            "Name": "foo.test",
            "Inputs": SIGNER,
            "Endpoint": "https://ropsten.infura.io"
        }),
    );

    assert_ok!(h.handler.handle(&without, "stream").await);
    assert_ok!(h.handler.handle(&with, "stream").await);

    assert_eq!(
        *h.endpoints.lock().unwrap(),
        vec![
            "http://localhost:8545".to_string(),
            "https://ropsten.infura.io".to_string()
        ]
    );
}

#[tokio::test]
async fn invalid_configuration_is_rejected_up_front() {
    let mut config = test_config();
    config.secret_name = String::new();
    let (factory, _) = MockClientFactory::new(MockEnsClient::new());

    let result = CustomResourceHandler::new(
        Arc::new(MemorySecretStore::new()),
        Box::new(factory),
        Arc::new(CountingFaucet::new()),
        Arc::new(RecordingResponder::new()),
        config,
    );

    assert!(matches!(result, Err(Error::Config(_))));
}
