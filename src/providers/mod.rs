// ABOUTME: Provisioning handler contract and concrete provider handlers.
// ABOUTME: Each handler wraps one provider CLI call behind a uniform trait.

mod aws_ec2;
mod azure_vm;
mod azure_webapp;
mod command;

pub use aws_ec2::AwsEc2Provisioner;
pub use azure_vm::AzureVmProvisioner;
pub use azure_webapp::AzureWebAppProvisioner;
pub use command::CliRunner;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Opaque identifier returned by a provider after successful provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    id: String,
    endpoint: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.endpoint {
            Some(endpoint) => write!(f, "{} ({})", self.id, endpoint),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Classified failure from a provisioning handler.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Connection-level failure likely to succeed on immediate retry.
    #[error("transient provisioning failure: {0}")]
    Transient(String),

    /// Failure that will not go away by retrying (bad credentials, bad
    /// parameters, quota).
    #[error("provisioning failed: {0}")]
    Permanent(String),

    /// The handler call exceeded its wall-clock bound.
    #[error("provisioning timed out after {0} seconds")]
    Timeout(u64),
}

impl ProvisionError {
    /// Whether the dispatcher may retry this failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProvisionError::Transient(_))
    }
}

/// Contract every provisioning handler must satisfy.
///
/// A handler wraps exactly one provider-specific provisioning routine. It
/// performs a single attempt per call and never retries internally; retry
/// and timeout policy belong to the dispatcher.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Short name for logging and registry listings.
    fn name(&self) -> &'static str;

    /// Parameter keys that must be present before the handler is invoked.
    fn required_parameters(&self) -> &'static [&'static str];

    /// Execute the provisioning call with the plan's parameters.
    async fn provision(
        &self,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<ResourceDescriptor, ProvisionError>;
}

impl std::fmt::Debug for dyn Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner").field("name", &self.name()).finish()
    }
}

/// Fetch a required string parameter.
///
/// The dispatcher checks key presence before invoking a handler, so a miss
/// here means the value had the wrong shape.
pub(crate) fn str_param<'a>(
    parameters: &'a BTreeMap<String, Value>,
    key: &str,
) -> Result<&'a str, ProvisionError> {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ProvisionError::Permanent(format!("parameter '{key}' must be a string")))
}

/// Fetch an optional string parameter, falling back to a default.
pub(crate) fn str_param_or<'a>(
    parameters: &'a BTreeMap<String, Value>,
    key: &str,
    default: &'a str,
) -> &'a str {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}
