//! Record reconciliation
//!
//! The Reconciler applies one resolver setter and, when that fails for a
//! known reason, runs a single remediation pass before retrying once.
//!
//! ## State Machine
//!
//! ```text
//!            ┌───────┐  ok
//!            │ Apply │─────────────────────────────────────┐
//!            └───────┘                                     │
//!   NameNotFound │        InsufficientFunds (faucet net)   │
//!        ┌───────┴────────────────┐                        │
//!        ▼                        ▼                        │
//! ┌─────────────────┐      ┌─────────────┐                 │
//! │ EnsureOwnership │      │   Faucet    │                 │
//! └─────────────────┘      └─────────────┘                 │
//!        ▼                        │                        │
//! ┌─────────────────┐             │                        │
//! │ EnsureResolver  │             │                        │
//! └─────────────────┘             │                        │
//!        └───────────┬────────────┘                        │
//!                    ▼                                     ▼
//!                ┌───────┐       any result          ┌──────────┐
//!                │ Retry │──────────────────────────▶│ Terminal │
//!                └───────┘                           └──────────┘
//! ```
//!
//! Any other failure of Apply, and any failure during remediation or Retry,
//! is terminal. Only one remediation branch runs per request.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::config::HandlerConfig;
use crate::error::{ChainError, ChainErrorKind, Error, Result};
use crate::name::{REVERSE_SUFFIX, RESOLVER_NAME, labelhash, normalize, same_name, split_label};
use crate::resource::{ResourceKind, SetterCall};
use crate::signer::Address;
use crate::traits::{ETH_CONTROLLER_INTERFACE_ID, EnsClient, Faucet, TxHash};

/// One desired record
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    /// Resource kind (decides the resolver flavour)
    pub kind: ResourceKind,
    /// Target ENS name
    pub name: String,
    /// Setter to apply on the name's resolver
    pub call: SetterCall,
    /// Transaction sender
    pub signer: Address,
}

/// Registrar used to take ownership of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrar {
    /// `.test` test registrar
    Test,
    /// `.eth` registrar controller
    Eth,
}

/// How ownership of the target name was established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The signer already owned the name
    AlreadyOwned,
    /// The signer's own reverse node was claimed
    ReverseClaimed,
    /// The name was registered
    Registered(Registrar),
}

/// Remediation performed before the successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    /// The first attempt succeeded
    None,
    /// Ownership and resolver were set up after `NameNotFound`
    Registration {
        ownership: Ownership,
        resolver: Address,
    },
    /// The signer was funded by the test-network faucet
    Faucet,
}

/// Result of a successful reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Transaction of the setter call that succeeded
    pub tx: TxHash,
    pub remediation: Remediation,
}

/// Facts derived once per remediation pass
#[derive(Debug)]
struct RemediationContext {
    reverse_name: String,
    /// Target is the signer's own reverse name
    self_reverse: bool,
}

impl RemediationContext {
    fn new(request: &ReconcileRequest) -> Result<Self> {
        let reverse_name = request.signer.reverse_name();
        let self_reverse = same_name(&request.name, &reverse_name)?;
        Ok(Self {
            reverse_name,
            self_reverse,
        })
    }
}

/// Drives one request through the remediation state machine
///
/// Every chain call is bounded by `timeouts.chain_call_secs`.
pub struct Reconciler<'a> {
    client: &'a dyn EnsClient,
    faucet: &'a dyn Faucet,
    config: &'a HandlerConfig,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a connected client
    pub fn new(client: &'a dyn EnsClient, faucet: &'a dyn Faucet, config: &'a HandlerConfig) -> Self {
        Self {
            client,
            faucet,
            config,
        }
    }

    /// Apply the request, remediating at most once
    pub async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileOutcome> {
        debug!(
            "Applying {} on {} via {}",
            request.call.method(),
            request.name,
            self.client.client_name()
        );

        let err = match self.apply(request).await {
            Ok(tx) => {
                info!("{} on {} succeeded: {}", request.call.method(), request.name, tx);
                return Ok(ReconcileOutcome {
                    tx,
                    remediation: Remediation::None,
                });
            }
            Err(err) => err,
        };

        let remediation = match err.chain_kind() {
            Some(ChainErrorKind::NameNotFound) => {
                info!("{}: registering and configuring resolver", err);
                let ctx = RemediationContext::new(request)?;
                let ownership = self.ensure_ownership(request, &ctx).await?;
                let resolver = self.ensure_resolver(request, &ctx).await?;
                Remediation::Registration {
                    ownership,
                    resolver,
                }
            }
            Some(ChainErrorKind::InsufficientFunds) => {
                let network_id = self.chain("net_version", self.client.network_id()).await?;
                if network_id != self.config.faucet.network_id {
                    return Err(err);
                }
                info!("{}: requesting faucet funds for {:?}", err, request.signer);
                self.faucet.request_funds(&request.signer).await?;
                Remediation::Faucet
            }
            _ => return Err(err),
        };

        let tx = self.apply(request).await.inspect_err(|e| {
            warn!("Retry of {} on {} failed: {}", request.call.method(), request.name, e);
        })?;
        info!(
            "{} on {} succeeded after {:?}: {}",
            request.call.method(),
            request.name,
            remediation,
            tx
        );

        Ok(ReconcileOutcome { tx, remediation })
    }

    async fn apply(&self, request: &ReconcileRequest) -> Result<TxHash> {
        self.chain(
            "apply",
            self.client.apply(&request.name, &request.call),
        )
        .await
    }

    async fn ensure_ownership(
        &self,
        request: &ReconcileRequest,
        ctx: &RemediationContext,
    ) -> Result<Ownership> {
        let owner = self.chain("owner", self.client.owner(&request.name)).await?;
        if owner == request.signer {
            debug!("{} already owned by {:?}", request.name, request.signer);
            return Ok(Ownership::AlreadyOwned);
        }

        if ctx.self_reverse {
            self.claim_reverse(request.signer).await?;
            return Ok(Ownership::ReverseClaimed);
        }

        let normalized = normalize(&request.name)?;
        let (label, parent) = split_label(&normalized);
        match parent {
            "test" => {
                let registrar = self.chain("owner", self.client.owner("test")).await?;
                info!("Registering {} with test registrar {:?}", normalized, registrar);
                self.chain(
                    "register",
                    self.client
                        .register_test(registrar, labelhash(label), request.signer),
                )
                .await?;
                Ok(Ownership::Registered(Registrar::Test))
            }
            "eth" => {
                let controller = self
                    .chain(
                        "interfaceImplementer",
                        self.client
                            .interface_implementer("eth", ETH_CONTROLLER_INTERFACE_ID),
                    )
                    .await?;
                info!("Registering {} with controller {:?}", normalized, controller);
                let secret: [u8; 32] = rand::random();
                self.chain(
                    "register",
                    self.client.register_eth(
                        controller,
                        label,
                        request.signer,
                        self.config.registration_duration_secs,
                        secret,
                    ),
                )
                .await?;
                Ok(Ownership::Registered(Registrar::Eth))
            }
            _ => Err(Error::DnsImportUnsupported(request.name.clone())),
        }
    }

    async fn ensure_resolver(
        &self,
        request: &ReconcileRequest,
        ctx: &RemediationContext,
    ) -> Result<Address> {
        let resolver = if request.kind.is_dns() {
            if ctx.self_reverse {
                self.deploy_dns_resolver().await?
            } else {
                let existing = self
                    .chain("resolver", self.client.resolver(&ctx.reverse_name))
                    .await?;
                match existing {
                    Some(resolver) => {
                        debug!("Reusing resolver {:?} of {}", resolver, ctx.reverse_name);
                        resolver
                    }
                    None => {
                        let owner = self
                            .chain("owner", self.client.owner(&ctx.reverse_name))
                            .await?;
                        if owner != request.signer {
                            self.claim_reverse(request.signer).await?;
                        }
                        let resolver = self.deploy_dns_resolver().await?;
                        self.chain(
                            "setResolver",
                            self.client.set_resolver(&ctx.reverse_name, resolver),
                        )
                        .await?;
                        resolver
                    }
                }
            }
        } else {
            self.chain("addr", self.client.addr(RESOLVER_NAME)).await?
        };

        info!("Setting resolver of {} to {:?}", request.name, resolver);
        self.chain(
            "setResolver",
            self.client.set_resolver(&request.name, resolver),
        )
        .await?;

        Ok(resolver)
    }

    async fn claim_reverse(&self, signer: Address) -> Result<()> {
        let registrar = self.chain("owner", self.client.owner(REVERSE_SUFFIX)).await?;
        info!("Claiming reverse record of {:?} via {:?}", signer, registrar);
        self.chain("claim", self.client.claim_reverse(registrar, signer))
            .await?;
        Ok(())
    }

    async fn deploy_dns_resolver(&self) -> Result<Address> {
        let resolver = self
            .chain("deploy", self.client.deploy_dns_resolver())
            .await?;
        info!("Deployed DNS resolver at {:?}", resolver);
        Ok(resolver)
    }

    /// Await a chain call under the configured timeout
    async fn chain<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ChainError>>,
    {
        let limit = self.config.timeouts.chain_call();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::timeout(format!("{} after {:?}", what, limit))),
        }
    }
}
