// ABOUTME: Configuration types and parsing for nephos.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and config discovery.

mod env_value;

pub use env_value::EnvValue;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "nephos.yml";
pub const CONFIG_FILENAME_ALT: &str = "nephos.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".nephos/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub decision: DecisionConfig,

    #[serde(default)]
    pub provision: ProvisionConfig,

    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    /// Where dispatch outcomes are appended, relative to the config dir.
    #[serde(default = "default_history_path")]
    pub history: PathBuf,
}

/// Decision service (Azure OpenAI) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    pub endpoint: String,

    #[serde(default = "default_deployment")]
    pub deployment: String,

    pub api_key: EnvValue,

    #[serde(default = "default_decision_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionConfig {
    #[serde(default = "default_provision_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            timeout: default_provision_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureConfig {
    /// Subscription passed to the Azure CLI; omitted uses the CLI default.
    #[serde(default)]
    pub subscription: Option<EnvValue>,

    #[serde(default = "default_azure_cli")]
    pub cli: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription: None,
            cli: default_azure_cli(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_aws_cli")]
    pub cli: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            cli: default_aws_cli(),
        }
    }
}

fn default_deployment() -> String {
    "gpt-4".to_string()
}

fn default_decision_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_provision_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_azure_cli() -> String {
    "az".to_string()
}

fn default_aws_cli() -> String {
    "aws".to_string()
}

fn default_history_path() -> PathBuf {
    PathBuf::from(".nephos/deployments.jsonl")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }
}

pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE_YAML)?;
    Ok(config_path)
}

const TEMPLATE_YAML: &str = r#"# nephos configuration
decision:
  endpoint: https://my-resource.openai.azure.com
  deployment: gpt-4
  api_key:
    env: AZURE_OPENAI_KEY
  timeout: 30s

provision:
  timeout: 10m

azure:
  subscription:
    env: AZURE_SUBSCRIPTION_ID
  cli: az

aws:
  region: us-east-1
  cli: aws
"#;
