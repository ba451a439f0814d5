// ABOUTME: Validation errors for raw routing decisions.
// ABOUTME: Distinguishes missing fields from unknown vocabulary values.

use thiserror::Error;

use super::Platform;

/// Errors from validating a raw routing decision against the plan schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required key is absent, not a string, or empty after trimming.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The platform value is outside the recognized set.
    #[error("unknown cloud platform: '{0}' (expected Azure or AWS)")]
    UnknownPlatform(String),

    /// The deployment kind is not valid for the resolved platform.
    #[error("unknown deployment type '{value}' for platform {platform}")]
    UnknownDeploymentKind { platform: Platform, value: String },
}

impl ValidationError {
    /// Name of the field a `MissingField` error refers to, if any.
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField(name) => Some(name),
            _ => None,
        }
    }
}
