// ABOUTME: Decision client mapping free-text requests to validated deployment plans.
// ABOUTME: Wraps the completion service with a strict output contract and schema validation.

use serde_json::Value;
use std::sync::Arc;

use crate::plan::{DeploymentPlan, DeploymentRequest};

use super::error::DecisionError;
use super::service::{CompletionError, CompletionService};

/// Fixed routing instruction. The closed vocabulary and the two-key output
/// contract keep the model's answer machine-checkable.
const SYSTEM_PROMPT: &str = "\
You are a cloud deployment routing assistant. Analyze the user request and determine:
1. Target cloud platform (Azure|AWS)
2. Deployment type (vm|webapp|ec2)

Rules:
- Choose 'AWS' if the request mentions AWS, EC2, or specific AWS services
- Choose 'Azure' for Azure-specific requests or when unspecified
- For AWS compute requests, choose 'ec2'
- For Azure compute requests, choose 'vm'
- For web applications on Azure, choose 'webapp'

Return a single JSON object with exactly these keys and no other text:
{
    \"cloud_platform\": \"Azure|AWS\",
    \"deployment_type\": \"vm|webapp|ec2\"
}";

/// Obtains a validated deployment plan for a request.
///
/// Stateless: each `route` call is one independent attempt against the
/// completion service, with no caching of prior requests. Retry policy
/// belongs to the dispatcher.
pub struct DecisionClient {
    service: Arc<dyn CompletionService>,
}

impl DecisionClient {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// Route a request to a validated (platform, kind) plan.
    ///
    /// The request's structured parameters are attached to the plan
    /// unchanged; the decision service only ever sees and returns the
    /// routing vocabulary.
    pub async fn route(&self, request: &DeploymentRequest) -> Result<DeploymentPlan, DecisionError> {
        let user_prompt = build_user_prompt(request);

        let raw = self
            .service
            .complete(SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(reclassify)?;

        tracing::debug!("Decision service returned: {}", raw.trim());

        let object = parse_decision(&raw)?;
        let plan = DeploymentPlan::validate(&object)
            .map_err(|source| DecisionError::InvalidPlan { source })?;

        Ok(plan.with_parameters(request.parameters().clone()))
    }
}

fn reclassify(err: CompletionError) -> DecisionError {
    // Auth, quota, network, and timeout all collapse to unavailability;
    // the caller cannot act on the distinction.
    DecisionError::UpstreamUnavailable(err.to_string())
}

/// Parse the service output as a single JSON object, tolerating markdown
/// code fences but nothing else around it.
fn parse_decision(raw: &str) -> Result<serde_json::Map<String, Value>, DecisionError> {
    let trimmed = strip_code_fences(raw.trim());

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| DecisionError::MalformedResponse(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(DecisionError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

fn strip_code_fences(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn build_user_prompt(request: &DeploymentRequest) -> String {
    if request.hints().is_empty() {
        return request.text().to_string();
    }

    let hints: Vec<String> = request
        .hints()
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect();

    format!(
        "{}\n\nAdditional context from architecture analysis:\n{}",
        request.text(),
        hints.join("\n")
    )
}
