// ABOUTME: Terminal deployment outcome value returned by every dispatch.
// ABOUTME: Either a resource descriptor or a typed dispatch error, never a crash.

use crate::providers::ResourceDescriptor;

use super::error::{DispatchError, DispatchErrorKind};

/// Result of one dispatch: success with a provider-assigned resource
/// descriptor, or a typed failure. Terminal; consumed by the caller.
#[derive(Debug)]
pub enum DeploymentOutcome {
    Success { resource: ResourceDescriptor },
    Failure { error: DispatchError },
}

impl DeploymentOutcome {
    pub fn success(resource: ResourceDescriptor) -> Self {
        DeploymentOutcome::Success { resource }
    }

    pub fn failure(error: impl Into<DispatchError>) -> Self {
        DeploymentOutcome::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Success { .. })
    }

    pub fn resource(&self) -> Option<&ResourceDescriptor> {
        match self {
            DeploymentOutcome::Success { resource } => Some(resource),
            DeploymentOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            DeploymentOutcome::Success { .. } => None,
            DeploymentOutcome::Failure { error } => Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<DispatchErrorKind> {
        self.error().map(DispatchError::kind)
    }
}
