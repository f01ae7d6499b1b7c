//! Error Processor
//!
//! Maps a raw error string to an [`ErrorRecord`], memoizing completion
//! results in the cache store.

use std::sync::Arc;
use std::time::Duration;

use crate::models::ErrorRecord;
use crate::services::cache::CacheStore;
use crate::services::llm::{CompletionService, LLMScenario};

/// Processing result with cache metadata
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub record: ErrorRecord,
    /// Whether this record was served from the cache
    pub from_cache: bool,
}

#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub key_prefix: String,
    pub cache_ttl: Duration,
    pub completion_timeout: Duration,
}

pub struct ErrorProcessor {
    cache: Arc<dyn CacheStore>,
    completion: Arc<dyn CompletionService>,
    settings: ProcessorSettings,
}

impl ErrorProcessor {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        completion: Arc<dyn CompletionService>,
        settings: ProcessorSettings,
    ) -> Self {
        Self { cache, completion, settings }
    }

    pub fn cache_key(&self, error_text: &str) -> String {
        ErrorRecord::cache_key(&self.settings.key_prefix, error_text)
    }

    /// Resolve a solution for `error_text`. Never fails: completion errors are
    /// returned in-band as an `API error: ...` solution and are not cached.
    pub async fn process(&self, error_text: &str) -> ProcessOutcome {
        let cache_key = self.cache_key(error_text);

        if let Some(record) = self.lookup(&cache_key).await {
            tracing::info!("Cache hit for key: {}", cache_key);
            return ProcessOutcome { record, from_cache: true };
        }

        tracing::info!("Cache miss, calling completion API");

        let started = std::time::Instant::now();
        let result = self
            .completion
            .complete_scenario(
                LLMScenario::ErrorSolution,
                error_text,
                self.settings.completion_timeout,
            )
            .await;

        let record = match result {
            Ok(solution) => {
                tracing::debug!("Completion finished in {:?}", started.elapsed());
                let record = ErrorRecord::new(error_text, solution);
                self.store(&cache_key, &record).await;
                record
            },
            Err(e) => {
                tracing::error!("Error during completion API call: {}", e);
                ErrorRecord::api_failure(error_text, &e)
            },
        };

        ProcessOutcome { record, from_cache: false }
    }

    /// Cached record for `cache_key`. Unreadable or corrupt entries count as a miss.
    async fn lookup(&self, cache_key: &str) -> Option<ErrorRecord> {
        let raw = match self.cache.get(cache_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Cache read failed for key {}: {}", cache_key, e);
                return None;
            },
        };

        match ErrorRecord::from_json(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", cache_key, e);
                None
            },
        }
    }

    async fn store(&self, cache_key: &str, record: &ErrorRecord) {
        let value = match record.to_json() {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to encode record for {}: {}", cache_key, e);
                return;
            },
        };

        if let Err(e) = self.cache.set_ex(cache_key, &value, self.settings.cache_ttl).await {
            tracing::error!("Failed to cache record for {}: {}", cache_key, e);
        }
    }
}
