//! LLM integration for the relay.
//!
//! `OpenAiProvider` speaks the OpenAI-compatible `/chat/completions` API over
//! reqwest. `CompletionClient` wraps a provider and is the single place where
//! provider failures are turned into values.

pub mod completion;
pub mod openai;
pub mod provider;

pub use completion::{CompletionClient, CompletionResult, SamplingParams};
pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;

use crate::config::ProviderConfig;

/// Create the completion provider from configuration.
///
/// Never fails: a missing key is reported on the first request instead.
pub fn create_provider(config: &ProviderConfig) -> Arc<dyn LlmProvider> {
    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        has_key = config.api_key.is_some(),
        "Using OpenAI-compatible provider"
    );
    Arc::new(OpenAiProvider::new(
        config.api_key.clone(),
        &config.model,
        &config.base_url,
    ))
}
