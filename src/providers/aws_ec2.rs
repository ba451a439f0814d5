// ABOUTME: AWS EC2 provisioning handler.
// ABOUTME: Wraps `aws ec2 run-instances` and returns the instance ID.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{CliRunner, ProvisionError, Provisioner, ResourceDescriptor, str_param};

/// Provisions an EC2 instance through the AWS CLI.
pub struct AwsEc2Provisioner {
    cli: CliRunner,
}

impl AwsEc2Provisioner {
    pub fn new(cli: CliRunner) -> Self {
        Self { cli }
    }

    fn build_args(&self, parameters: &BTreeMap<String, Value>) -> Result<Vec<String>, ProvisionError> {
        let mut args = vec![
            "ec2".to_string(),
            "run-instances".to_string(),
            "--image-id".to_string(),
            str_param(parameters, "ami")?.to_string(),
            "--instance-type".to_string(),
            str_param(parameters, "instance_type")?.to_string(),
            "--count".to_string(),
            "1".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];

        if let Some(name) = parameters.get("instance_name").and_then(Value::as_str)
            && !name.is_empty()
        {
            args.push("--tag-specifications".to_string());
            args.push(format!(
                "ResourceType=instance,Tags=[{{Key=Name,Value={name}}}]"
            ));
        }

        if let Some(key) = parameters.get("key_pair").and_then(Value::as_str)
            && !key.is_empty()
        {
            args.push("--key-name".to_string());
            args.push(key.to_string());
        }

        if let Some(groups) = parameters.get("security_group_ids").and_then(Value::as_array) {
            let ids: Vec<&str> = groups.iter().filter_map(Value::as_str).collect();
            if !ids.is_empty() {
                args.push("--security-group-ids".to_string());
                args.extend(ids.iter().map(|s| s.to_string()));
            }
        }

        if let Some(subnet) = parameters.get("subnet_id").and_then(Value::as_str)
            && !subnet.is_empty()
        {
            args.push("--subnet-id".to_string());
            args.push(subnet.to_string());
        }

        Ok(args)
    }
}

#[async_trait]
impl Provisioner for AwsEc2Provisioner {
    fn name(&self) -> &'static str {
        "aws-ec2"
    }

    fn required_parameters(&self) -> &'static [&'static str] {
        &["ami", "instance_type"]
    }

    async fn provision(
        &self,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<ResourceDescriptor, ProvisionError> {
        let args = self.build_args(parameters)?;
        let response = self.cli.run_json(&args).await?;

        let instance = response
            .get("Instances")
            .and_then(Value::as_array)
            .and_then(|instances| instances.first())
            .ok_or_else(|| {
                ProvisionError::Permanent("run-instances response missing 'Instances'".to_string())
            })?;

        let id = instance
            .get("InstanceId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProvisionError::Permanent("run-instances response missing 'InstanceId'".to_string())
            })?;

        let mut descriptor = ResourceDescriptor::new(id);
        if let Some(dns) = instance.get("PublicDnsName").and_then(Value::as_str)
            && !dns.is_empty()
        {
            descriptor = descriptor.with_endpoint(dns);
        }

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_params() -> BTreeMap<String, Value> {
        [("ami", json!("ami-123")), ("instance_type", json!("t2.micro"))]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn minimal_args_omit_optionals() {
        let p = AwsEc2Provisioner::new(CliRunner::new("aws"));
        let args = p.build_args(&minimal_params()).unwrap();
        assert!(args.windows(2).any(|w| w == ["--image-id", "ami-123"]));
        assert!(!args.contains(&"--key-name".to_string()));
        assert!(!args.contains(&"--tag-specifications".to_string()));
    }

    #[test]
    fn instance_name_becomes_name_tag() {
        let mut params = minimal_params();
        params.insert("instance_name".to_string(), json!("web-01"));
        let p = AwsEc2Provisioner::new(CliRunner::new("aws"));
        let args = p.build_args(&params).unwrap();
        let tag = args.iter().find(|a| a.contains("Key=Name")).unwrap();
        assert!(tag.contains("Value=web-01"));
    }

    #[test]
    fn security_groups_are_expanded() {
        let mut params = minimal_params();
        params.insert("security_group_ids".to_string(), json!(["sg-1", "sg-2"]));
        let p = AwsEc2Provisioner::new(CliRunner::new("aws"));
        let args = p.build_args(&params).unwrap();
        let pos = args.iter().position(|a| a == "--security-group-ids").unwrap();
        assert_eq!(&args[pos + 1..pos + 3], &["sg-1", "sg-2"]);
    }
}
