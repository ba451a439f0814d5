// ABOUTME: Dispatcher orchestrating route, validate, resolve, and provision.
// ABOUTME: Owns timeout and single-retry policy; every exit path is a DeploymentOutcome.

mod error;
mod outcome;

pub use error::{DispatchError, DispatchErrorKind};
pub use outcome::DeploymentOutcome;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::decision::{DecisionClient, DecisionError};
use crate::history::{DeploymentRecord, HistoryLog};
use crate::plan::{DeploymentPlan, DeploymentRequest, ValidationError};
use crate::providers::{ProvisionError, Provisioner, ResourceDescriptor};
use crate::registry::HandlerRegistry;

const DEFAULT_DECISION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PROVISION_TIMEOUT: Duration = Duration::from_secs(600);

/// Sequencing authority for deployment requests.
///
/// Holds only read-only collaborators plus the append-only history log,
/// so concurrent `dispatch` calls share nothing mutable on the decision
/// path. Dropping the returned future cancels a dispatch; once a handler
/// call has begun, cancellation is best-effort and the underlying
/// provisioning action may already have started.
pub struct Dispatcher {
    decision: DecisionClient,
    registry: HandlerRegistry,
    history: Option<Arc<HistoryLog>>,
    decision_timeout: Duration,
    provision_timeout: Duration,
}

impl Dispatcher {
    pub fn new(decision: DecisionClient, registry: HandlerRegistry) -> Self {
        Self {
            decision,
            registry,
            history: None,
            decision_timeout: DEFAULT_DECISION_TIMEOUT,
            provision_timeout: DEFAULT_PROVISION_TIMEOUT,
        }
    }

    /// Record every outcome in the given history log.
    pub fn with_history(mut self, history: Arc<HistoryLog>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout = timeout;
        self
    }

    pub fn with_provision_timeout(mut self, timeout: Duration) -> Self {
        self.provision_timeout = timeout;
        self
    }

    /// Execute one deployment request end to end.
    ///
    /// Total function: upstream (decision service) or downstream (provider
    /// CLI) misbehavior surfaces as a typed failure, never as a panic or
    /// propagated error.
    pub async fn dispatch(&self, request: &DeploymentRequest) -> DeploymentOutcome {
        let (plan, outcome) = self.dispatch_inner(request).await;

        if let Some(log) = &self.history {
            let record = DeploymentRecord::from_outcome(plan.as_ref(), &outcome);
            if let Err(e) = log.append(&record) {
                tracing::warn!("Failed to record deployment history: {e}");
            }
        }

        outcome
    }

    async fn dispatch_inner(
        &self,
        request: &DeploymentRequest,
    ) -> (Option<DeploymentPlan>, DeploymentOutcome) {
        let plan = match self.route(request).await {
            Ok(plan) => plan,
            Err(e) => return (None, DeploymentOutcome::failure(e)),
        };

        tracing::info!("Routed request to {}", plan);

        let handler = match self.registry.resolve(plan.platform(), plan.kind()) {
            Ok(handler) => Arc::clone(handler),
            Err(e) => return (Some(plan), DeploymentOutcome::failure(e)),
        };

        // Fail fast before any external side effect.
        if let Some(missing) = first_missing_parameter(handler.as_ref(), &plan) {
            let error = ValidationError::MissingField(missing.to_string());
            return (Some(plan), DeploymentOutcome::failure(error));
        }

        let outcome = match self.provision_with_retry(handler.as_ref(), &plan).await {
            Ok(resource) => {
                tracing::info!("Provisioned {}: {}", handler.name(), resource);
                DeploymentOutcome::success(resource)
            }
            Err(e) => DeploymentOutcome::failure(e),
        };

        (Some(plan), outcome)
    }

    /// One routing attempt under the decision timeout. Routing failures
    /// are never retried: an LLM failure is not assumed transient, and
    /// masking a genuinely malformed request helps nobody.
    async fn route(&self, request: &DeploymentRequest) -> Result<DeploymentPlan, DecisionError> {
        match timeout(self.decision_timeout, self.decision.route(request)).await {
            Ok(result) => result,
            Err(_) => Err(DecisionError::UpstreamUnavailable(format!(
                "decision timed out after {}s",
                self.decision_timeout.as_secs()
            ))),
        }
    }

    /// Invoke the handler under the provision timeout, retrying exactly
    /// once when the failure is transient. Timeouts and permanent
    /// failures surface immediately.
    async fn provision_with_retry(
        &self,
        handler: &dyn Provisioner,
        plan: &DeploymentPlan,
    ) -> Result<ResourceDescriptor, ProvisionError> {
        match self.provision_once(handler, plan).await {
            Err(e) if e.is_transient() => {
                tracing::warn!("{} failed transiently, retrying once: {}", handler.name(), e);
                self.provision_once(handler, plan).await
            }
            other => other,
        }
    }

    async fn provision_once(
        &self,
        handler: &dyn Provisioner,
        plan: &DeploymentPlan,
    ) -> Result<ResourceDescriptor, ProvisionError> {
        match timeout(self.provision_timeout, handler.provision(plan.parameters())).await {
            Ok(result) => result,
            Err(_) => Err(ProvisionError::Timeout(self.provision_timeout.as_secs())),
        }
    }
}

fn first_missing_parameter<'a>(
    handler: &'a dyn Provisioner,
    plan: &DeploymentPlan,
) -> Option<&'a str> {
    handler
        .required_parameters()
        .iter()
        .find(|key| !plan.parameters().contains_key(**key))
        .copied()
}
