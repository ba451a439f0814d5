// ABOUTME: Unified dispatch error with SNAFU pattern.
// ABOUTME: Wraps decision, validation, lookup, and provisioning failures for programmatic handling.

use snafu::Snafu;

use crate::decision::DecisionError;
use crate::plan::ValidationError;
use crate::providers::ProvisionError;
use crate::registry::LookupError;

/// Unified error carried by a failed deployment outcome.
///
/// Every failure below the dispatcher is converted into one of these
/// variants at the dispatch boundary; nothing propagates past `dispatch`
/// as an unchecked failure.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DispatchError {
    #[snafu(display("request routing failed: {source}"))]
    Decision { source: DecisionError },

    #[snafu(display("plan validation failed: {source}"))]
    Validation { source: ValidationError },

    #[snafu(display("no handler available: {source}"))]
    Lookup { source: LookupError },

    #[snafu(display("provisioning failed: {source}"))]
    Provisioning { source: ProvisionError },
}

/// Flat error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// Decision service output was not a structured object.
    MalformedResponse,
    /// Decision parsed but failed schema validation.
    InvalidPlan,
    /// Decision service unreachable, over quota, or timed out.
    UpstreamUnavailable,
    /// A required handler parameter was absent.
    MissingField,
    /// Platform outside the recognized set.
    UnknownPlatform,
    /// Deployment kind not valid for the platform.
    UnknownDeploymentKind,
    /// Schema-valid pair with no handler wired up.
    NoHandlerRegistered,
    /// Provisioning failed on a connection-level error (retry exhausted).
    TransientProvisioning,
    /// Provisioning failed permanently.
    PermanentProvisioning,
    /// Provisioning exceeded its wall-clock bound.
    ProvisioningTimeout,
}

impl DispatchError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            DispatchError::Decision { source } => match source {
                DecisionError::MalformedResponse(_) => DispatchErrorKind::MalformedResponse,
                DecisionError::InvalidPlan { source } => validation_kind(source),
                DecisionError::UpstreamUnavailable(_) => DispatchErrorKind::UpstreamUnavailable,
            },
            DispatchError::Validation { source } => validation_kind(source),
            DispatchError::Lookup {
                source: LookupError::NoHandlerRegistered { .. },
            } => DispatchErrorKind::NoHandlerRegistered,
            DispatchError::Provisioning { source } => match source {
                ProvisionError::Transient(_) => DispatchErrorKind::TransientProvisioning,
                ProvisionError::Permanent(_) => DispatchErrorKind::PermanentProvisioning,
                ProvisionError::Timeout(_) => DispatchErrorKind::ProvisioningTimeout,
            },
        }
    }
}

fn validation_kind(err: &ValidationError) -> DispatchErrorKind {
    match err {
        ValidationError::MissingField(_) => DispatchErrorKind::MissingField,
        ValidationError::UnknownPlatform(_) => DispatchErrorKind::UnknownPlatform,
        ValidationError::UnknownDeploymentKind { .. } => DispatchErrorKind::UnknownDeploymentKind,
    }
}

impl From<DecisionError> for DispatchError {
    fn from(source: DecisionError) -> Self {
        DispatchError::Decision { source }
    }
}

impl From<ValidationError> for DispatchError {
    fn from(source: ValidationError) -> Self {
        DispatchError::Validation { source }
    }
}

impl From<LookupError> for DispatchError {
    fn from(source: LookupError) -> Self {
        DispatchError::Lookup { source }
    }
}

impl From<ProvisionError> for DispatchError {
    fn from(source: ProvisionError) -> Self {
        DispatchError::Provisioning { source }
    }
}
