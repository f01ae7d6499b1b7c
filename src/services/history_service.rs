//! History Reader
//!
//! Read-only enumeration of cached error records.

use std::sync::Arc;

use crate::models::ErrorRecord;
use crate::services::cache::CacheStore;

pub struct HistoryService {
    cache: Arc<dyn CacheStore>,
    key_prefix: String,
}

impl HistoryService {
    pub fn new(cache: Arc<dyn CacheStore>, key_prefix: impl Into<String>) -> Self {
        Self { cache, key_prefix: key_prefix.into() }
    }

    /// Every decodable record under the error namespace, in store order.
    ///
    /// Corrupt entries are logged and skipped; a failed scan yields an empty list.
    pub async fn list_history(&self) -> Vec<ErrorRecord> {
        let keys = match self.cache.scan_prefix(&self.key_prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!("Failed to enumerate keys under '{}': {}", self.key_prefix, e);
                return Vec::new();
            },
        };

        let mut history = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = match self.cache.get(&key).await {
                Ok(Some(raw)) => raw,
                // expired between scan and read
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!("Failed to read {}: {}", key, e);
                    continue;
                },
            };

            match ErrorRecord::from_json(&raw) {
                Ok(record) => history.push(record),
                Err(e) => tracing::error!("Failed to decode JSON for {}: {}", key, e),
            }
        }

        tracing::debug!("Loaded {} history records", history.len());
        history
    }
}
