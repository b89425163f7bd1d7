// # Secret Store Implementations
//
// In-process implementations of the SecretStore trait. The AWS-backed store
// lives in the `ens-secrets-ssm` crate.

pub mod memory;

pub use memory::MemorySecretStore;
