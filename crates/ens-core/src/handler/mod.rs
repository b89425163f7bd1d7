//! Custom-resource invocation handling
//!
//! The CustomResourceHandler is responsible for:
//! - Resolving the signer (explicit key, stored key, or a new stored key)
//! - Dispatching the resource type to a resolver setter
//! - Connecting a client and running the [`Reconciler`]
//! - Delivering exactly one response to the callback URL
//!
//! ## Event Flow
//!
//! 1. Event received (Create / Update / Delete)
//! 2. Delete: report SUCCESS, no chain writes
//! 3. Otherwise resolve signer, default the name to the signer's reverse name
//! 4. Reconcile the record
//! 5. PUT SUCCESS (with name and namehash) or FAILED (with the error) to `ResponseURL`

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::HandlerConfig;
use crate::error::Result;
use crate::event::{
    CustomResourceEvent, CustomResourceResponse, RequestType, ResponseData, physical_resource_id,
};
use crate::name::namehash_hex;
use crate::reconciler::{ReconcileRequest, Reconciler};
use crate::resource::{ResourceKind, dispatch, normalize_inputs};
use crate::signer::resolve_signing_key;
use crate::traits::{ClientParams, EnsClientFactory, Faucet, ResponseSink, SecretStore};

/// Handles CloudFormation custom-resource events for ENS records
///
/// ## Lifecycle
///
/// 1. Create once per process with [`CustomResourceHandler::new()`]
/// 2. Call [`CustomResourceHandler::handle()`] per event
///
/// Invocations share no state beyond the injected collaborators.
pub struct CustomResourceHandler {
    /// Persisted signer key
    secrets: Arc<dyn SecretStore>,

    /// Per-invocation chain clients
    clients: Box<dyn EnsClientFactory>,

    /// Test-network faucet
    faucet: Arc<dyn Faucet>,

    /// Callback delivery
    responder: Arc<dyn ResponseSink>,

    config: HandlerConfig,
}

impl CustomResourceHandler {
    /// Create a new handler
    ///
    /// # Parameters
    ///
    /// - `secrets`: Secret store holding the default signer key
    /// - `clients`: Factory connecting an EnsClient per endpoint and signer
    /// - `faucet`: Faucet used on the configured test network
    /// - `responder`: Delivers the response to CloudFormation
    /// - `config`: Handler configuration
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        clients: Box<dyn EnsClientFactory>,
        faucet: Arc<dyn Faucet>,
        responder: Arc<dyn ResponseSink>,
        config: HandlerConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            secrets,
            clients,
            faucet,
            responder,
            config,
        })
    }

    /// Handle one event and deliver its response
    ///
    /// # Parameters
    ///
    /// - `event`: The custom-resource event
    /// - `log_stream`: Log stream of this invocation, the default physical id
    ///
    /// # Returns
    ///
    /// - `Ok(response)`: The response was delivered (it may report FAILED)
    /// - `Err(Error)`: Delivery itself failed
    pub async fn handle(
        &self,
        event: &CustomResourceEvent,
        log_stream: &str,
    ) -> Result<CustomResourceResponse> {
        let physical_id = physical_resource_id(event, log_stream);
        info!(
            "{:?} {} ({}) request {}",
            event.request_type, event.resource_type, event.logical_resource_id, event.request_id
        );

        let response = match self.process(event).await {
            Ok((reason, data)) => {
                CustomResourceResponse::success(event, &physical_id, reason, data)
            }
            Err(e) => {
                error!("{} {} failed: {}", event.resource_type, event.logical_resource_id, e);
                CustomResourceResponse::failed(event, &physical_id, e.to_string())
            }
        };

        self.responder.deliver(&event.response_url, &response).await?;
        debug!("Response {:?} delivered for {}", response.status, event.request_id);

        Ok(response)
    }

    async fn process(&self, event: &CustomResourceEvent) -> Result<(String, Option<ResponseData>)> {
        if event.request_type == RequestType::Delete {
            info!("Delete leaves chain state untouched");
            return Ok(("Delete is a no-op".to_string(), None));
        }

        let properties = &event.resource_properties;
        let kind = ResourceKind::from_resource_type(&event.resource_type)?;

        let signer = resolve_signing_key(
            properties.private_key.as_deref(),
            self.secrets.as_ref(),
            &self.config.secret_name,
        )
        .await?;
        let from = signer.address();

        let name = match properties.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => from.reverse_name(),
        };
        let namehash = namehash_hex(&name)?;
        let call = dispatch(&kind, normalize_inputs(properties.inputs.clone()))?;

        let endpoint = properties
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.config.default_endpoint.clone());

        let client = self.clients.connect(&ClientParams {
            endpoint,
            signer,
            registry: self.config.registry_address,
            gas: self.config.gas,
        })?;

        let request = ReconcileRequest {
            kind,
            name,
            call,
            signer: from,
        };
        let outcome = Reconciler::new(client.as_ref(), self.faucet.as_ref(), &self.config)
            .reconcile(&request)
            .await?;

        let data = ResponseData {
            name: request.name,
            namehash,
        };
        Ok((outcome.tx.to_string(), Some(data)))
    }
}
