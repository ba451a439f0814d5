// ABOUTME: Routing decision layer backed by an external text-completion service.
// ABOUTME: Exports the client, service trait, and decision errors.

mod client;
mod error;
mod openai;
mod service;

pub use client::DecisionClient;
pub use error::DecisionError;
pub use openai::AzureOpenAi;
pub use service::{CompletionError, CompletionService};
