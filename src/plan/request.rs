// ABOUTME: Incoming deployment request value type.
// ABOUTME: Carries the raw user text plus structured parameter hints.

use serde_json::Value;
use std::collections::BTreeMap;

/// A single incoming deployment request.
///
/// Created once per user action and discarded after a plan is produced.
/// The free text drives routing; the structured parameters are handed to
/// the resolved provisioning handler unchanged. Hints come from alternate
/// front ends (e.g. diagram analysis) and are folded into the routing
/// prompt, never into handler parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRequest {
    text: String,
    parameters: BTreeMap<String, Value>,
    hints: BTreeMap<String, Value>,
}

impl DeploymentRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: BTreeMap::new(),
            hints: BTreeMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: BTreeMap<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_hints(mut self, hints: BTreeMap<String, Value>) -> Self {
        self.hints = hints;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    pub fn hints(&self) -> &BTreeMap<String, Value> {
        &self.hints
    }
}
