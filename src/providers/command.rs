// ABOUTME: Provider CLI process execution with failure classification.
// ABOUTME: Spawns az/aws commands, captures output, and sorts errors into transient/permanent.

use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

use super::ProvisionError;

/// Runs a provider CLI and captures its output.
///
/// Handlers build argument vectors; this runner owns process spawning,
/// output capture, and failure classification so the classification rules
/// live in one place.
#[derive(Debug, Clone)]
pub struct CliRunner {
    program: String,
    env: HashMap<String, String>,
}

impl CliRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            env: HashMap::new(),
        }
    }

    /// Add an environment variable passed to every invocation.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the CLI with the given arguments and return stdout on success.
    pub async fn run(&self, args: &[String]) -> Result<String, ProvisionError> {
        tracing::debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| classify_spawn_error(&self.program, &e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                "{} exited with {:?}: {}",
                self.program,
                output.status.code(),
                stderr.trim()
            );
            Err(classify_cli_failure(stderr.trim()))
        }
    }

    /// Run the CLI and parse stdout as a JSON document.
    pub async fn run_json(&self, args: &[String]) -> Result<serde_json::Value, ProvisionError> {
        let stdout = self.run(args).await?;
        serde_json::from_str(&stdout).map_err(|e| {
            ProvisionError::Permanent(format!("{} returned invalid JSON: {e}", self.program))
        })
    }
}

fn classify_spawn_error(program: &str, err: &std::io::Error) -> ProvisionError {
    // A missing binary never fixes itself; everything else at spawn time
    // (fd exhaustion, fork failure) may.
    if err.kind() == std::io::ErrorKind::NotFound {
        ProvisionError::Permanent(format!("'{program}' not found on PATH"))
    } else {
        ProvisionError::Transient(format!("failed to spawn '{program}': {err}"))
    }
}

/// Patterns in CLI stderr that indicate a connection-level failure.
const TRANSIENT_MARKERS: &[&str] = &[
    "connection reset",
    "connection refused",
    "connection aborted",
    "timed out",
    "temporarily unavailable",
    "throttl",
    "rate exceeded",
    "too many requests",
    "service unavailable",
    "502",
    "503",
    "504",
];

fn classify_cli_failure(stderr: &str) -> ProvisionError {
    let lower = stderr.to_ascii_lowercase();
    if TRANSIENT_MARKERS.iter().any(|m| lower.contains(m)) {
        ProvisionError::Transient(stderr.to_string())
    } else {
        ProvisionError::Permanent(stderr.to_string())
    }
}
