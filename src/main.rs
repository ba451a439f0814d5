// ABOUTME: Entry point for the nephos CLI application.
// ABOUTME: Parses arguments, assembles the dispatcher, and runs commands.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use nephos::config::{self, Config};
use nephos::decision::{AzureOpenAi, DecisionClient};
use nephos::dispatch::{DeploymentOutcome, Dispatcher};
use nephos::error::{Error, Result};
use nephos::history::{HistoryLog, RecordStatus};
use nephos::output::{Output, OutputMode};
use nephos::plan::{DeploymentKind, DeploymentRequest, Platform};
use nephos::providers::{
    AwsEc2Provisioner, AzureVmProvisioner, AzureWebAppProvisioner, CliRunner,
};
use nephos::registry::HandlerRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    let result = run(cli, output).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut output: Output) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            let path = config::init_config(&cwd, force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Deploy { request, params } => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            let parameters = parse_params(&params)?;
            deploy(&config, &cwd, &request, parameters, &mut output).await
        }
        Commands::Route { request } => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            route(&config, &request, &output).await
        }
        Commands::History => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            history(&config, &cwd, &output)
        }
    }
}

/// Route and execute one deployment request.
async fn deploy(
    config: &Config,
    base_dir: &Path,
    request: &str,
    parameters: BTreeMap<String, Value>,
    output: &mut Output,
) -> Result<()> {
    let history = Arc::new(HistoryLog::open(&base_dir.join(&config.history))?);
    let dispatcher = build_dispatcher(config)?.with_history(history);

    let request = DeploymentRequest::new(request).with_parameters(parameters);

    output.start_timer();
    output.progress("Routing request...");

    match dispatcher.dispatch(&request).await {
        DeploymentOutcome::Success { resource } => {
            output.success(&format!("Deployed: {resource}"));
            Ok(())
        }
        DeploymentOutcome::Failure { error } => {
            output.error(&error.to_string());
            std::process::exit(1);
        }
    }
}

/// Route a request and print the plan without provisioning anything.
async fn route(config: &Config, request: &str, output: &Output) -> Result<()> {
    let decision = build_decision_client(config)?;
    let request = DeploymentRequest::new(request);

    match decision.route(&request).await {
        Ok(plan) => {
            output.success(&format!("Plan: {plan}"));
            Ok(())
        }
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Print past deployment outcomes, oldest first.
fn history(config: &Config, base_dir: &Path, output: &Output) -> Result<()> {
    let records = HistoryLog::load(&base_dir.join(&config.history))?;

    if records.is_empty() {
        output.progress("No deployments recorded yet");
        return Ok(());
    }

    for record in records {
        let target = match (record.platform, record.kind) {
            (Some(platform), Some(kind)) => format!("{platform}/{kind}"),
            _ => "unrouted".to_string(),
        };
        let detail = match record.status {
            RecordStatus::Success => record.resource_id.unwrap_or_default(),
            RecordStatus::Failure => record.error.unwrap_or_default(),
        };
        output.success(&format!(
            "{}  {:7}  {}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            format!("{:?}", record.status).to_lowercase(),
            target,
            detail
        ));
    }

    Ok(())
}

fn build_decision_client(config: &Config) -> Result<DecisionClient> {
    let api_key = config.decision.api_key.resolve()?;
    let service = AzureOpenAi::new(
        &config.decision.endpoint,
        &config.decision.deployment,
        api_key,
        config.decision.timeout,
    )
    .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    Ok(DecisionClient::new(Arc::new(service)))
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let decision = build_decision_client(config)?;
    let registry = build_registry(config)?;

    Ok(Dispatcher::new(decision, registry)
        .with_decision_timeout(config.decision.timeout)
        .with_provision_timeout(config.provision.timeout))
}

/// Assemble the static handler table. Runs once at startup; the registry
/// is read-only afterwards.
fn build_registry(config: &Config) -> Result<HandlerRegistry> {
    let subscription = config
        .azure
        .subscription
        .as_ref()
        .map(|v| v.resolve())
        .transpose()?;

    let az = CliRunner::new(&config.azure.cli);
    let mut aws = CliRunner::new(&config.aws.cli);
    if let Some(region) = &config.aws.region {
        aws = aws.env("AWS_DEFAULT_REGION", region);
    }

    Ok(HandlerRegistry::new()
        .register(
            Platform::Azure,
            DeploymentKind::Vm,
            Arc::new(AzureVmProvisioner::new(az.clone(), subscription.clone())),
        )
        .register(
            Platform::Azure,
            DeploymentKind::WebApp,
            Arc::new(AzureWebAppProvisioner::new(az, subscription)),
        )
        .register(
            Platform::Aws,
            DeploymentKind::Ec2,
            Arc::new(AwsEc2Provisioner::new(aws)),
        ))
}

/// Parse `key=value` pairs into handler parameters. Values that look like
/// JSON arrays or objects are parsed as JSON so list parameters (security
/// groups) can be passed from the command line.
fn parse_params(params: &[String]) -> Result<BTreeMap<String, Value>> {
    let mut map = BTreeMap::new();

    for param in params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| Error::InvalidParameter(format!("expected KEY=VALUE, got '{param}'")))?;

        if key.is_empty() {
            return Err(Error::InvalidParameter(format!(
                "empty key in '{param}'"
            )));
        }

        let parsed = if value.starts_with('[') || value.starts_with('{') {
            serde_json::from_str(value)
                .map_err(|e| Error::InvalidParameter(format!("invalid JSON in '{param}': {e}")))?
        } else {
            Value::String(value.to_string())
        };

        map.insert(key.to_string(), parsed);
    }

    Ok(map)
}
