//! Dashboard analytics: single-error summaries and cross-error trend prediction.

use std::sync::Arc;
use std::time::Duration;

use crate::services::history_service::HistoryService;
use crate::services::llm::{CompletionService, LLMError, LLMScenario};

pub struct AnalyticsService {
    history: Arc<HistoryService>,
    completion: Arc<dyn CompletionService>,
    completion_timeout: Duration,
}

impl AnalyticsService {
    pub fn new(
        history: Arc<HistoryService>,
        completion: Arc<dyn CompletionService>,
        completion_timeout: Duration,
    ) -> Self {
        Self { history, completion, completion_timeout }
    }

    /// Summarize arbitrary error details. Strings are used verbatim, other
    /// JSON values in their serialized form.
    pub async fn summarize(&self, error_details: &serde_json::Value) -> Result<String, LLMError> {
        let details = match error_details {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        self.completion
            .complete_scenario(LLMScenario::ErrorSummary, &details, self.completion_timeout)
            .await
    }

    /// One completion over the space-joined text of every cached error
    pub async fn predict_trends(&self) -> Result<String, LLMError> {
        let history = self.history.list_history().await;
        let error_text =
            history.iter().map(|r| r.error.as_str()).collect::<Vec<_>>().join(" ");

        tracing::info!("Predicting trends over {} cached errors", history.len());

        self.completion
            .complete_scenario(LLMScenario::TrendAnalysis, &error_text, self.completion_timeout)
            .await
    }
}
