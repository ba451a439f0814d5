// ABOUTME: Typed deployment plan schema and validation.
// ABOUTME: Turns raw routing decisions into validated (platform, kind) plans.

mod error;
mod request;

pub use error::ValidationError;
pub use request::DeploymentRequest;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key the decision service must use for the target platform.
pub const PLATFORM_KEY: &str = "cloud_platform";
/// Key the decision service must use for the deployment kind.
pub const KIND_KEY: &str = "deployment_type";

/// Target cloud platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Azure,
    Aws,
}

impl Platform {
    /// Parse a platform name, trimming whitespace and ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "azure" => Some(Platform::Azure),
            "aws" => Some(Platform::Aws),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Azure => write!(f, "Azure"),
            Platform::Aws => write!(f, "AWS"),
        }
    }
}

/// Kind of resource to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentKind {
    Vm,
    WebApp,
    Ec2,
}

impl DeploymentKind {
    /// Parse a deployment kind, trimming whitespace and ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vm" => Some(DeploymentKind::Vm),
            "webapp" => Some(DeploymentKind::WebApp),
            "ec2" => Some(DeploymentKind::Ec2),
            _ => None,
        }
    }

    /// Whether this kind can be deployed on the given platform.
    pub fn valid_for(&self, platform: Platform) -> bool {
        match self {
            DeploymentKind::Vm | DeploymentKind::WebApp => platform == Platform::Azure,
            DeploymentKind::Ec2 => platform == Platform::Aws,
        }
    }
}

impl fmt::Display for DeploymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentKind::Vm => write!(f, "vm"),
            DeploymentKind::WebApp => write!(f, "webapp"),
            DeploymentKind::Ec2 => write!(f, "ec2"),
        }
    }
}

/// A validated, typed deployment plan.
///
/// Produced by the decision client, consumed by the dispatcher. Plans are
/// never mutated after creation; an invalid raw decision is rejected, not
/// repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentPlan {
    platform: Platform,
    kind: DeploymentKind,
    parameters: BTreeMap<String, Value>,
}

impl DeploymentPlan {
    /// Validate a raw routing decision against the schema.
    ///
    /// Requires `cloud_platform` and `deployment_type` keys, each a
    /// non-empty string. Matching is case-insensitive and trims
    /// surrounding whitespace. Extra keys (the model also likes to return
    /// cost estimates) are ignored. Pure: no side effects, and identical
    /// input always yields an identical plan.
    pub fn validate(raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        let platform_raw = require_string(raw, PLATFORM_KEY)?;
        let kind_raw = require_string(raw, KIND_KEY)?;

        let platform = Platform::parse(platform_raw)
            .ok_or_else(|| ValidationError::UnknownPlatform(platform_raw.trim().to_string()))?;

        let kind = DeploymentKind::parse(kind_raw)
            .filter(|k| k.valid_for(platform))
            .ok_or_else(|| ValidationError::UnknownDeploymentKind {
                platform,
                value: kind_raw.trim().to_string(),
            })?;

        Ok(Self {
            platform,
            kind,
            parameters: BTreeMap::new(),
        })
    }

    /// Attach handler parameters to the plan.
    pub fn with_parameters(mut self, parameters: BTreeMap<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn kind(&self) -> DeploymentKind {
        self.kind
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }
}

impl fmt::Display for DeploymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform, self.kind)
    }
}

fn require_string<'a>(raw: &'a Map<String, Value>, key: &str) -> Result<&'a str, ValidationError> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingField(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(platform: &str, kind: &str) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert(PLATFORM_KEY.to_string(), json!(platform));
        m.insert(KIND_KEY.to_string(), json!(kind));
        m
    }

    #[test]
    fn validate_accepts_mixed_case() {
        let plan = DeploymentPlan::validate(&raw("Azure", "VM")).unwrap();
        assert_eq!(plan.platform(), Platform::Azure);
        assert_eq!(plan.kind(), DeploymentKind::Vm);
    }

    #[test]
    fn validate_trims_whitespace() {
        let plan = DeploymentPlan::validate(&raw("  aws ", " ec2\n")).unwrap();
        assert_eq!(plan.platform(), Platform::Aws);
        assert_eq!(plan.kind(), DeploymentKind::Ec2);
    }

    #[test]
    fn validate_rejects_unknown_platform() {
        let err = DeploymentPlan::validate(&raw("gcp", "vm")).unwrap_err();
        assert_eq!(err, ValidationError::UnknownPlatform("gcp".to_string()));
    }

    #[test]
    fn validate_rejects_kind_invalid_for_platform() {
        let err = DeploymentPlan::validate(&raw("azure", "ec2")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownDeploymentKind {
                platform: Platform::Azure,
                value: "ec2".to_string(),
            }
        );
    }

    #[test]
    fn validate_rejects_missing_key() {
        let mut m = Map::new();
        m.insert(PLATFORM_KEY.to_string(), json!("azure"));
        let err = DeploymentPlan::validate(&m).unwrap_err();
        assert_eq!(err.missing_field(), Some(KIND_KEY));
    }

    #[test]
    fn validate_rejects_empty_string() {
        let err = DeploymentPlan::validate(&raw("", "vm")).unwrap_err();
        assert_eq!(err.missing_field(), Some(PLATFORM_KEY));
    }

    #[test]
    fn validate_rejects_non_string_value() {
        let mut m = raw("azure", "vm");
        m.insert(PLATFORM_KEY.to_string(), json!(42));
        let err = DeploymentPlan::validate(&m).unwrap_err();
        assert_eq!(err.missing_field(), Some(PLATFORM_KEY));
    }

    #[test]
    fn validate_ignores_extra_keys() {
        let mut m = raw("aws", "ec2");
        m.insert("estimated_cost".to_string(), json!("$15/month"));
        assert!(DeploymentPlan::validate(&m).is_ok());
    }

    #[test]
    fn validate_is_idempotent() {
        let input = raw("Azure", "webapp");
        let first = DeploymentPlan::validate(&input).unwrap();
        let second = DeploymentPlan::validate(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn kind_platform_validity() {
        assert!(DeploymentKind::Vm.valid_for(Platform::Azure));
        assert!(DeploymentKind::WebApp.valid_for(Platform::Azure));
        assert!(DeploymentKind::Ec2.valid_for(Platform::Aws));
        assert!(!DeploymentKind::Ec2.valid_for(Platform::Azure));
        assert!(!DeploymentKind::Vm.valid_for(Platform::Aws));
    }
}
