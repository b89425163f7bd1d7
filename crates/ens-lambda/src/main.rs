// # ens-lambda - ENS Custom Resource Lambda
//
// Thin integration layer: all ENS logic lives in ens-core.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Wiring the alloy client, SSM secret store, faucet and responder
// 4. Serving CloudFormation custom-resource events from the Lambda runtime API
//
// ## Configuration
//
// ### Chain
// - `ENS_DEFAULT_ENDPOINT`: JSON-RPC endpoint when a request has no `Endpoint`
// - `ENS_REGISTRY_ADDRESS`: ENS registry contract address
// - `ENS_DNS_RESOLVER_BYTECODE`: Creation bytecode (hex) of the DNS resolver
//
// ### Signer
// - `ENS_SECRET_NAME`: SSM parameter holding the default signer key
//
// ### Faucet
// - `ENS_FAUCET_URL`: Faucet base URL; the signer address is appended
// - `ENS_FAUCET_NETWORK_ID`: Network on which the faucet is used
//
// ### Timeouts
// - `ENS_CHAIN_CALL_TIMEOUT_SECS`: One chain read or transaction round-trip
// - `ENS_HTTP_TIMEOUT_SECS`: Faucet and response delivery requests
//
// ### Logging
// - `ENS_LOG_LEVEL`: trace, debug, info, warn, error (default info)

use anyhow::{Context, Result};
use ens_client_alloy::AlloyClientFactory;
use ens_core::{CustomResourceEvent, CustomResourceHandler, CustomResourceResponse, HandlerConfig};
use ens_http::{HttpFaucet, HttpResponder};
use ens_secrets_ssm::SsmSecretStore;
use lambda_runtime::{LambdaEvent, service_fn};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the bootstrap process
#[derive(Debug, Clone, Copy)]
enum LambdaExitCode {
    /// Runtime loop ended
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<LambdaExitCode> for ExitCode {
    fn from(code: LambdaExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    handler: HandlerConfig,
    dns_resolver_bytecode: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable source
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut handler = HandlerConfig::default();

        if let Some(endpoint) = var("ENS_DEFAULT_ENDPOINT") {
            handler.default_endpoint = endpoint;
        }
        if let Some(registry) = var("ENS_REGISTRY_ADDRESS") {
            handler.registry_address = registry
                .parse()
                .with_context(|| format!("ENS_REGISTRY_ADDRESS is not an address: {}", registry))?;
        }
        if let Some(name) = var("ENS_SECRET_NAME") {
            handler.secret_name = name;
        }
        if let Some(url) = var("ENS_FAUCET_URL") {
            handler.faucet.url = url;
        }
        if let Some(id) = var("ENS_FAUCET_NETWORK_ID") {
            handler.faucet.network_id = parse_number("ENS_FAUCET_NETWORK_ID", &id)?;
        }
        if let Some(secs) = var("ENS_CHAIN_CALL_TIMEOUT_SECS") {
            handler.timeouts.chain_call_secs = parse_number("ENS_CHAIN_CALL_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("ENS_HTTP_TIMEOUT_SECS") {
            handler.timeouts.http_secs = parse_number("ENS_HTTP_TIMEOUT_SECS", &secs)?;
        }

        Ok(Self {
            handler,
            dns_resolver_bytecode: var("ENS_DNS_RESOLVER_BYTECODE").filter(|s| !s.trim().is_empty()),
            log_level: var("ENS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.handler
            .validate()
            .context("Invalid handler configuration")?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ENS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Non-fatal configuration concerns, logged once tracing is up
    fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.handler.default_endpoint.starts_with("http://") {
            warnings.push(
                "ENS_DEFAULT_ENDPOINT uses HTTP (not HTTPS). \
                Transactions are signed locally but RPC traffic is visible."
                    .to_string(),
            );
        }
        warnings
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a positive integer. Got: {}", key, value))
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return LambdaExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return LambdaExitCode::ConfigError.into();
    }

    // Lambda captures stdout; ANSI colors would end up in CloudWatch
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .with_ansi(false)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return LambdaExitCode::ConfigError.into();
    }

    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return LambdaExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let handler = match build_handler(config).await {
            Ok(handler) => handler,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return LambdaExitCode::ConfigError;
            }
        };

        if let Err(e) = serve(&handler).await {
            error!("Runtime error: {}", e);
            LambdaExitCode::RuntimeError
        } else {
            LambdaExitCode::CleanShutdown
        }
    })
    .into()
}

/// Wire the production collaborators
async fn build_handler(config: Config) -> Result<CustomResourceHandler> {
    let Config {
        handler: handler_config,
        dns_resolver_bytecode,
        ..
    } = config;

    let clients = AlloyClientFactory::new(dns_resolver_bytecode.as_deref())?;
    let faucet = HttpFaucet::new(handler_config.faucet.clone(), &handler_config.timeouts)?;
    let responder = HttpResponder::new(&handler_config.timeouts)?;
    let secrets = SsmSecretStore::from_env().await;

    info!(
        "Handler ready: default endpoint {}, registry {}, secret {}",
        handler_config.default_endpoint, handler_config.registry_address, handler_config.secret_name
    );

    let handler = CustomResourceHandler::new(
        Arc::new(secrets),
        Box::new(clients),
        Arc::new(faucet),
        Arc::new(responder),
        handler_config,
    )?;
    Ok(handler)
}

/// Run the Lambda runtime loop until the runtime API goes away
async fn serve(handler: &CustomResourceHandler) -> Result<(), lambda_runtime::Error> {
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<CustomResourceEvent>| async move {
            invoke(handler, event).await
        },
    ))
    .await
}

async fn invoke(
    handler: &CustomResourceHandler,
    event: LambdaEvent<CustomResourceEvent>,
) -> Result<CustomResourceResponse, lambda_runtime::Error> {
    let response = handler
        .handle(&event.payload, &event.context.env_config.log_stream)
        .await?;
    Ok(response)
}
