//! LLM Data Models

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Chat Messages
// ============================================================================

/// Role of a message in a chat completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One role-tagged message of a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

// ============================================================================
// LLM Error Types
// ============================================================================

/// Completion service errors
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Completion API key not configured")]
    NotConfigured,

    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("LLM response parsing error: {0}")]
    ParseError(String),

    #[error("LLM timeout after {0:?}")]
    Timeout(Duration),

    #[error("LLM rate limited, retry after {0}s")]
    RateLimited(u64),
}
