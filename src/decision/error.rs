// ABOUTME: Error types for the routing decision step.
// ABOUTME: Separates malformed output, invalid plans, and upstream failures.

use thiserror::Error;

use crate::plan::ValidationError;

/// Errors from obtaining a deployment plan for a request.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// The decision service returned something that is not a JSON object.
    #[error("decision service returned a malformed response: {0}")]
    MalformedResponse(String),

    /// The decision parsed but failed plan schema validation.
    #[error("routing decision failed validation: {source}")]
    InvalidPlan {
        #[source]
        source: ValidationError,
    },

    /// The decision service call itself failed (network, auth, quota,
    /// timeout). Never retried here; one attempt per route call.
    #[error("decision service unavailable: {0}")]
    UpstreamUnavailable(String),
}
