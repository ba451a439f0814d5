// ABOUTME: Azure WebApp provisioning handler.
// ABOUTME: Creates an App Service plan plus web app and returns the default hostname.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{CliRunner, ProvisionError, Provisioner, ResourceDescriptor, str_param, str_param_or};

const DEFAULT_RUNTIME: &str = "python:3.9";
const DEFAULT_SKU: &str = "F1";

/// Shorthand runtime names mapped to the App Service linux-fx format.
const RUNTIME_MAPPINGS: &[(&str, &str)] = &[
    ("python:3.9", "PYTHON|3.9"),
    ("python:3.8", "PYTHON|3.8"),
    ("node:16-lts", "NODE|16-lts"),
    ("node:18-lts", "NODE|18-lts"),
    ("dotnet:6", "DOTNETCORE|6.0"),
    ("php:8", "PHP|8.0"),
];

/// Provisions an Azure WebApp (App Service plan + site) through the Azure CLI.
pub struct AzureWebAppProvisioner {
    cli: CliRunner,
    subscription: Option<String>,
}

impl AzureWebAppProvisioner {
    pub fn new(cli: CliRunner, subscription: Option<String>) -> Self {
        Self { cli, subscription }
    }

    fn subscription_args(&self) -> Vec<String> {
        match &self.subscription {
            Some(sub) => vec!["--subscription".to_string(), sub.clone()],
            None => vec![],
        }
    }
}

/// Normalize a runtime string to the `STACK|VERSION` format the API expects.
/// Unknown shorthands fall back to the default, matching the lenient
/// behavior users expect from routing free-text requests.
fn resolve_runtime(runtime: &str) -> String {
    if runtime.contains('|') {
        return runtime.to_string();
    }
    if let Some((_, mapped)) = RUNTIME_MAPPINGS.iter().find(|(short, _)| *short == runtime) {
        return mapped.to_string();
    }
    tracing::warn!("Unknown runtime '{runtime}', defaulting to PYTHON|3.9");
    "PYTHON|3.9".to_string()
}

#[async_trait]
impl Provisioner for AzureWebAppProvisioner {
    fn name(&self) -> &'static str {
        "azure-webapp"
    }

    fn required_parameters(&self) -> &'static [&'static str] {
        &["resource_group", "app_name", "location"]
    }

    async fn provision(
        &self,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<ResourceDescriptor, ProvisionError> {
        let resource_group = str_param(parameters, "resource_group")?;
        let app_name = str_param(parameters, "app_name")?;
        let location = str_param(parameters, "location")?;
        let sku = str_param_or(parameters, "sku", DEFAULT_SKU);
        let runtime = resolve_runtime(str_param_or(parameters, "runtime", DEFAULT_RUNTIME));

        let plan_name = format!("{app_name}-plan");

        // App Service plan first; linux is required for the runtime stacks
        // we map.
        let mut plan_args = vec![
            "appservice".to_string(),
            "plan".to_string(),
            "create".to_string(),
            "--resource-group".to_string(),
            resource_group.to_string(),
            "--name".to_string(),
            plan_name.clone(),
            "--location".to_string(),
            location.to_string(),
            "--sku".to_string(),
            sku.to_string(),
            "--is-linux".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        plan_args.extend(self.subscription_args());
        self.cli.run_json(&plan_args).await?;

        let mut app_args = vec![
            "webapp".to_string(),
            "create".to_string(),
            "--resource-group".to_string(),
            resource_group.to_string(),
            "--plan".to_string(),
            plan_name,
            "--name".to_string(),
            app_name.to_string(),
            "--runtime".to_string(),
            runtime,
            "--output".to_string(),
            "json".to_string(),
        ];
        app_args.extend(self.subscription_args());
        let response = self.cli.run_json(&app_args).await?;

        let id = response.get("id").and_then(Value::as_str).ok_or_else(|| {
            ProvisionError::Permanent("az webapp create response missing 'id'".to_string())
        })?;

        let mut descriptor = ResourceDescriptor::new(id);
        if let Some(host) = response.get("defaultHostName").and_then(Value::as_str)
            && !host.is_empty()
        {
            descriptor = descriptor.with_endpoint(format!("https://{host}"));
        }

        Ok(descriptor)
    }
}
