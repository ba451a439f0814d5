// ABOUTME: Static lookup table mapping (platform, kind) pairs to provisioning handlers.
// ABOUTME: Built once at startup, read-only for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::plan::{DeploymentKind, Platform};
use crate::providers::Provisioner;

/// Error from resolving a handler.
///
/// Distinct from schema validation: a plan can name a recognized
/// (platform, kind) pair and still have no handler wired up in this
/// process (feature not deployed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no handler registered for {platform}/{kind}")]
    NoHandlerRegistered {
        platform: Platform,
        kind: DeploymentKind,
    },
}

/// Registry of provisioning handlers keyed by (platform, kind).
///
/// Assembled at startup and never mutated afterwards, so concurrent
/// dispatches can resolve handlers without locking.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(Platform, DeploymentKind), Arc<dyn Provisioner>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a (platform, kind) pair. Re-registering a
    /// pair replaces the previous handler.
    pub fn register(
        mut self,
        platform: Platform,
        kind: DeploymentKind,
        handler: Arc<dyn Provisioner>,
    ) -> Self {
        self.handlers.insert((platform, kind), handler);
        self
    }

    /// Resolve the handler for a (platform, kind) pair.
    pub fn resolve(
        &self,
        platform: Platform,
        kind: DeploymentKind,
    ) -> Result<&Arc<dyn Provisioner>, LookupError> {
        self.handlers
            .get(&(platform, kind))
            .ok_or(LookupError::NoHandlerRegistered { platform, kind })
    }

    /// Registered (platform, kind, handler-name) triples, for listings.
    pub fn entries(&self) -> Vec<(Platform, DeploymentKind, &'static str)> {
        let mut entries: Vec<_> = self
            .handlers
            .iter()
            .map(|((platform, kind), handler)| (*platform, *kind, handler.name()))
            .collect();
        entries.sort_by_key(|(platform, kind, _)| (format!("{platform}"), format!("{kind}")));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
