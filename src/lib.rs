//! LogSage Library
//!
//! Error-log ingestion pipeline (queue → completion API → TTL cache) and the
//! dashboard that reads it.

use std::sync::Arc;

pub mod config;
pub mod embedded;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use models::ErrorRecord;
pub use services::{
    AnalyticsService, CacheStore, CompletionService, ErrorLogConsumer, ErrorProcessor,
    HistoryService, LLMError, QueueSource,
};

/// Application shared state
///
/// Client handles are constructed once in `main` and injected here; handlers
/// hold no mutable state of their own.
#[derive(Clone)]
pub struct AppState {
    pub history_service: Arc<HistoryService>,
    pub analytics_service: Arc<AnalyticsService>,
}
