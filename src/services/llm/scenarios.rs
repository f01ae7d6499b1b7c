//! Prompt framing for each completion use case.

use super::models::ChatMessage;

/// LLM completion scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LLMScenario {
    /// Remediation for a single error consumed from the queue
    ErrorSolution,
    /// Dashboard summary of one error
    ErrorSummary,
    /// Dashboard trend prediction across all cached errors
    TrendAnalysis,
}

impl LLMScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ErrorSolution => "error_solution",
            Self::ErrorSummary => "error_summary",
            Self::TrendAnalysis => "trend_analysis",
        }
    }

    /// Build the message list for this scenario around `input`
    pub fn messages(&self, input: &str) -> Vec<ChatMessage> {
        match self {
            Self::ErrorSolution => vec![
                ChatMessage::user(format!("Error log: {}", input)),
                ChatMessage::assistant(
                    "Analyse and please provide a solution or suggestion for this error i am \
                     creating a logging analytic portal for my team",
                ),
            ],
            Self::ErrorSummary => vec![
                ChatMessage::user(format!("Summarize this error log: {}", input)),
                ChatMessage::assistant("I need a concise summary for a dashboard display."),
            ],
            Self::TrendAnalysis => vec![
                ChatMessage::user(format!("Analyze these error patterns: {}", input)),
                ChatMessage::assistant(
                    "Analyze the error patterns provided and predict potential trends or future \
                     issues. Offer concise, actionable insights in 2-3 sentences.",
                ),
            ],
        }
    }
}
