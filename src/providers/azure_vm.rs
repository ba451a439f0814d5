// ABOUTME: Azure virtual machine provisioning handler.
// ABOUTME: Wraps `az vm create` and returns the VM resource ID.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{CliRunner, ProvisionError, Provisioner, ResourceDescriptor, str_param, str_param_or};

const DEFAULT_VM_SIZE: &str = "Standard_D2s_v3";
const DEFAULT_IMAGE: &str = "Ubuntu2204";

/// Provisions an Azure VM through the Azure CLI.
pub struct AzureVmProvisioner {
    cli: CliRunner,
    subscription: Option<String>,
}

impl AzureVmProvisioner {
    pub fn new(cli: CliRunner, subscription: Option<String>) -> Self {
        Self { cli, subscription }
    }

    fn build_args(&self, parameters: &BTreeMap<String, Value>) -> Result<Vec<String>, ProvisionError> {
        let mut args = vec![
            "vm".to_string(),
            "create".to_string(),
            "--resource-group".to_string(),
            str_param(parameters, "resource_group")?.to_string(),
            "--name".to_string(),
            str_param(parameters, "vm_name")?.to_string(),
            "--location".to_string(),
            str_param(parameters, "location")?.to_string(),
            "--admin-username".to_string(),
            str_param(parameters, "admin_username")?.to_string(),
            "--admin-password".to_string(),
            str_param(parameters, "admin_password")?.to_string(),
            "--size".to_string(),
            str_param_or(parameters, "vm_size", DEFAULT_VM_SIZE).to_string(),
            "--image".to_string(),
            str_param_or(parameters, "image", DEFAULT_IMAGE).to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];

        if let Some(sub) = &self.subscription {
            args.push("--subscription".to_string());
            args.push(sub.clone());
        }

        Ok(args)
    }
}

#[async_trait]
impl Provisioner for AzureVmProvisioner {
    fn name(&self) -> &'static str {
        "azure-vm"
    }

    fn required_parameters(&self) -> &'static [&'static str] {
        &[
            "resource_group",
            "location",
            "vm_name",
            "admin_username",
            "admin_password",
        ]
    }

    async fn provision(
        &self,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<ResourceDescriptor, ProvisionError> {
        let args = self.build_args(parameters)?;
        let response = self.cli.run_json(&args).await?;

        let id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProvisionError::Permanent("az vm create response missing 'id'".to_string())
            })?;

        let mut descriptor = ResourceDescriptor::new(id);
        if let Some(ip) = response.get("publicIpAddress").and_then(Value::as_str)
            && !ip.is_empty()
        {
            descriptor = descriptor.with_endpoint(ip);
        }

        Ok(descriptor)
    }
}
