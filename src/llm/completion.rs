//! Completion client — one provider call per conversational request.

use std::sync::Arc;

use tracing::{info, warn};

use super::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::error::LlmError;

/// Outcome of one completion call. `Ok` may carry an empty reply.
pub type CompletionResult = Result<String, LlmError>;

/// Sampling parameters fixed per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Wraps a provider and converts every failure into a `CompletionResult`.
#[derive(Clone)]
pub struct CompletionClient {
    llm: Arc<dyn LlmProvider>,
}

impl CompletionClient {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Send `system_prompt` followed by `history` (in order) to the provider.
    pub async fn complete(
        &self,
        system_prompt: &str,
        history: Vec<ChatMessage>,
        params: SamplingParams,
    ) -> CompletionResult {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history);

        let request = CompletionRequest::new(messages)
            .with_temperature(params.temperature)
            .with_max_tokens(params.max_tokens);

        match self.llm.complete(request).await {
            Ok(response) => {
                info!(
                    model = self.llm.model_name(),
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    response_id = response.response_id.as_deref().unwrap_or("-"),
                    "Completion succeeded"
                );
                Ok(response.content)
            }
            Err(e) => {
                warn!(model = self.llm.model_name(), error = %e, "Completion failed");
                Err(e)
            }
        }
    }
}
