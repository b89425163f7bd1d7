// # HTTP Collaborators
//
// This crate provides the two outbound HTTP calls of the ENS handler:
//
// - [`HttpFaucet`]: GET `<faucet url><address>` to fund the signer on a test network
// - [`HttpResponder`]: PUT the custom-resource response to the pre-signed `ResponseURL`
//
// Both are single-shot: one request, any 2xx is success, everything else is
// an error. Retrying is never done here.

use async_trait::async_trait;
use ens_core::config::{FaucetConfig, TimeoutConfig};
use ens_core::event::CustomResourceResponse;
use ens_core::traits::{Faucet, ResponseSink};
use ens_core::{Address, Error, Result};
use std::time::Duration;

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Test-network faucet over HTTP GET
#[derive(Debug, Clone)]
pub struct HttpFaucet {
    config: FaucetConfig,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpFaucet {
    /// Create a new faucet client
    ///
    /// # Parameters
    ///
    /// - `config`: Faucet base URL (the address is appended)
    /// - `timeouts`: `http_secs` bounds the whole request
    pub fn new(config: FaucetConfig, timeouts: &TimeoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: build_client(timeouts.http())?,
        })
    }
}

#[async_trait]
impl Faucet for HttpFaucet {
    async fn request_funds(&self, address: &Address) -> Result<()> {
        let url = self.config.url_for(address);
        tracing::info!("Requesting faucet funds: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::faucet(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::faucet(format!("HTTP {} - {}", status, body.trim())));
        }

        tracing::debug!("Faucet accepted request for {:?}", address);
        Ok(())
    }
}

/// CloudFormation response delivery over HTTP PUT
#[derive(Debug, Clone)]
pub struct HttpResponder {
    client: reqwest::Client,
}

impl HttpResponder {
    /// Create a new responder
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(timeouts.http())?,
        })
    }
}

#[async_trait]
impl ResponseSink for HttpResponder {
    async fn deliver(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()> {
        let body = serde_json::to_string(response)?;

        // Pre-signed S3 URLs are signed without a content type
        let reply = self
            .client
            .put(response_url)
            .header(reqwest::header::CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::callback(format!("Request failed: {}", e)))?;

        let status = reply.status();
        if !status.is_success() {
            let text = reply
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::callback(format!("HTTP {} - {}", status, text.trim())));
        }

        tracing::info!("Delivered {:?} response", response.status);
        Ok(())
    }
}
