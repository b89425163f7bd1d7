// # SSM Secret Store
//
// Keeps the handler's signer key in AWS Systems Manager Parameter Store as a
// `SecureString` parameter.
//
// ## Trust Level: Untrusted (Secret Store)
//
// **Allowed Capabilities**:
// - ✅ Read and write parameters by name
// - ✅ Decrypt `SecureString` values
//
// **Forbidden Capabilities**:
// - ❌ Log parameter values
// - ❌ Retry (a failed read or write fails the invocation)
// - ❌ Generate keys (owned by signer resolution)
//
// ## Error Mapping
//
// - `ParameterNotFound` → `Error::SecretNotFound`
// - every other service or transport error → `Error::SecretStore`

use async_trait::async_trait;
use aws_sdk_ssm::error::{DisplayErrorContext, SdkError};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::types::ParameterType;
use ens_core::traits::SecretStore;
use ens_core::{Error, Result};

/// Parameter Store backed secret store
#[derive(Clone)]
pub struct SsmSecretStore {
    client: aws_sdk_ssm::Client,
}

// Parameter values are never held, so only the client region is shown
impl std::fmt::Debug for SsmSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmSecretStore")
            .field("region", &self.client.config().region())
            .finish()
    }
}

impl SsmSecretStore {
    /// Wrap an existing SSM client
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration
    ///
    /// Region and credentials come from the usual environment variables and
    /// the Lambda execution role.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_ssm::Client::new(&config))
    }
}

/// Map a `GetParameter` service error
fn map_get_error(name: &str, err: GetParameterError) -> Error {
    if err.is_parameter_not_found() {
        Error::secret_not_found(name)
    } else {
        Error::secret_store(format!("GetParameter {}: {}", name, DisplayErrorContext(&err)))
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String> {
        let output = match self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
        {
            Ok(output) => output,
            Err(SdkError::ServiceError(service)) => return Err(map_get_error(name, service.into_err())),
            Err(other) => {
                return Err(Error::secret_store(format!(
                    "GetParameter {}: {}",
                    name,
                    DisplayErrorContext(&other)
                )));
            }
        };

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| Error::secret_store(format!("Parameter {} has no value", name)))
    }

    async fn put_secret(&self, name: &str, value: &str) -> Result<()> {
        self.client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::SecureString)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| {
                Error::secret_store(format!("PutParameter {}: {}", name, DisplayErrorContext(&e)))
            })?;

        tracing::info!("Stored secret {} in SSM", name);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "ssm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ssm::config::{BehaviorVersion, Region};
    use aws_sdk_ssm::types::error::{InvalidKeyId, ParameterNotFound};

    fn offline_store() -> SsmSecretStore {
        let config = aws_sdk_ssm::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .build();
        SsmSecretStore::new(aws_sdk_ssm::Client::from_conf(config))
    }

    #[test]
    fn test_parameter_not_found_is_secret_not_found() {
        let err = GetParameterError::ParameterNotFound(ParameterNotFound::builder().build());
        assert!(matches!(
            map_get_error("privateKey", err),
            Error::SecretNotFound(name) if name == "privateKey"
        ));
    }

    #[test]
    fn test_other_service_errors_are_store_errors() {
        let err = GetParameterError::InvalidKeyId(
            InvalidKeyId::builder().message("key disabled").build(),
        );
        let mapped = map_get_error("privateKey", err);
        assert!(matches!(mapped, Error::SecretStore(_)));
        assert!(mapped.to_string().contains("privateKey"));
    }

    #[test]
    fn test_store_name() {
        assert_eq!(offline_store().store_name(), "ssm");
    }

    #[test]
    fn test_debug_shows_region() {
        let debug = format!("{:?}", offline_store());
        assert!(debug.contains("eu-west-1"));
    }
}
