//! Completion Service Trait

use async_trait::async_trait;
use std::time::Duration;

use super::models::{ChatMessage, LLMError};
use super::scenarios::LLMScenario;

/// Request/response text generation, the seam every caller depends on.
///
/// Every call carries an explicit timeout. Implementations report an elapsed
/// timeout as [`LLMError::Timeout`].
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the messages and return the first choice's generated text
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        timeout: Duration,
    ) -> Result<String, LLMError>;

    /// Frame `input` with the scenario's instructions and complete it
    async fn complete_scenario(
        &self,
        scenario: LLMScenario,
        input: &str,
        timeout: Duration,
    ) -> Result<String, LLMError> {
        tracing::debug!("Completion request for scenario {}", scenario.as_str());
        self.complete(scenario.messages(input), timeout).await
    }
}
