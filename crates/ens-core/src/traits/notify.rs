// # Outbound HTTP Collaborators
//
// - [`Faucet`]: funds the signer on a test network
// - [`ResponseSink`]: delivers the custom-resource response to CloudFormation
//
// ## Implementations
//
// - reqwest: `ens-http` crate

use async_trait::async_trait;

use crate::event::CustomResourceResponse;
use crate::signer::Address;

/// Trait for test-network faucets
#[async_trait]
pub trait Faucet: Send + Sync {
    /// Request funds for `address`
    ///
    /// Any non-2xx status is an error.
    async fn request_funds(&self, address: &Address) -> Result<(), crate::Error>;
}

/// Trait for custom-resource response delivery
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Deliver `response` to the pre-signed `response_url`
    ///
    /// Any non-2xx status is an error.
    async fn deliver(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), crate::Error>;
}
