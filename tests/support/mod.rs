// ABOUTME: Test support utilities.
// ABOUTME: Provides mock completion services and spy provisioners for dispatch tests.

use async_trait::async_trait;
use nephos::decision::{CompletionError, CompletionService, DecisionClient};
use nephos::dispatch::Dispatcher;
use nephos::providers::{ProvisionError, Provisioner, ResourceDescriptor};
use nephos::registry::HandlerRegistry;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Completion service returning a fixed response.
pub struct CannedCompletion {
    response: String,
}

impl CannedCompletion {
    pub fn new(response: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            response: response.into(),
        })
    }

    /// Canned decision for the given platform/kind pair.
    pub fn decision(platform: &str, kind: &str) -> Arc<Self> {
        Self::new(format!(
            r#"{{"cloud_platform":"{platform}","deployment_type":"{kind}"}}"#
        ))
    }
}

#[async_trait]
impl CompletionService for CannedCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, CompletionError> {
        Ok(self.response.clone())
    }
}

/// Completion service whose call always fails at the transport level.
pub struct FailingCompletion;

#[async_trait]
impl CompletionService for FailingCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Http("connection refused".to_string()))
    }
}

/// Completion service that never answers within any reasonable bound.
pub struct HangingCompletion;

#[async_trait]
impl CompletionService for HangingCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, CompletionError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(CompletionError::Timeout)
    }
}

/// Scripted result for a spy provisioner call.
pub enum SpyResult {
    Ok(&'static str),
    Transient,
    Permanent,
}

/// Provisioner that records invocations and plays back scripted results.
///
/// With an empty script every call succeeds with a fixed descriptor, so
/// simple tests only need to assert the call count.
pub struct SpyProvisioner {
    name: &'static str,
    required: &'static [&'static str],
    delay: Option<Duration>,
    calls: AtomicUsize,
    script: parking_lot::Mutex<VecDeque<SpyResult>>,
}

impl SpyProvisioner {
    pub fn new(name: &'static str, required: &'static [&'static str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            required,
            delay: None,
            calls: AtomicUsize::new(0),
            script: parking_lot::Mutex::new(VecDeque::new()),
        })
    }

    /// Like `new`, but every call takes at least `delay` to complete.
    pub fn slow(
        name: &'static str,
        required: &'static [&'static str],
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            required,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            script: parking_lot::Mutex::new(VecDeque::new()),
        })
    }

    pub fn script(self: &Arc<Self>, results: impl IntoIterator<Item = SpyResult>) {
        self.script.lock().extend(results);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provisioner for SpyProvisioner {
    fn name(&self) -> &'static str {
        self.name
    }

    fn required_parameters(&self) -> &'static [&'static str] {
        self.required
    }

    async fn provision(
        &self,
        _parameters: &BTreeMap<String, Value>,
    ) -> Result<ResourceDescriptor, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.script.lock().pop_front() {
            Some(SpyResult::Ok(id)) => Ok(ResourceDescriptor::new(id)),
            Some(SpyResult::Transient) => {
                Err(ProvisionError::Transient("connection reset".to_string()))
            }
            Some(SpyResult::Permanent) => {
                Err(ProvisionError::Permanent("access denied".to_string()))
            }
            None => Ok(ResourceDescriptor::new("spy-resource")),
        }
    }
}

/// Dispatcher wired to the given completion service and registry, with
/// short timeouts suitable for tests.
pub fn dispatcher(service: Arc<dyn CompletionService>, registry: HandlerRegistry) -> Dispatcher {
    Dispatcher::new(DecisionClient::new(service), registry)
        .with_decision_timeout(Duration::from_millis(500))
        .with_provision_timeout(Duration::from_millis(500))
}

/// Parameters map from string pairs.
pub fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}
