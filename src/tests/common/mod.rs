// Common test utilities and fakes for the external collaborators

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::AppState;
use crate::services::cache::{CacheError, CacheStore, MemoryCacheStore};
use crate::services::llm::{ChatMessage, CompletionService, LLMError};
use crate::services::queue::{QueueError, QueueMessage, QueueSource};
use crate::services::{AnalyticsService, ErrorProcessor, HistoryService, ProcessorSettings};

pub const TEST_PREFIX: &str = "error:";
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Completion fake
// ============================================================================

enum Behavior {
    Reply(String),
    Fail(String),
    /// Takes this long to answer; callers' timeouts apply
    Slow(Duration),
}

/// Completion service double that records every request
pub struct FakeCompletion {
    behavior: Mutex<Behavior>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeCompletion {
    fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self { behavior: Mutex::new(behavior), calls: Mutex::new(Vec::new()) })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Behavior::Reply(text.to_string()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with(Behavior::Fail(message.to_string()))
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::with(Behavior::Slow(delay))
    }

    pub fn set_reply(&self, text: &str) {
        *self.behavior.lock().unwrap() = Behavior::Reply(text.to_string());
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// User-role content of the n-th request
    pub fn prompt(&self, n: usize) -> String {
        self.calls()[n][0].content.clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        timeout: Duration,
    ) -> Result<String, LLMError> {
        self.calls.lock().unwrap().push(messages);

        let delay = match &*self.behavior.lock().unwrap() {
            Behavior::Reply(text) => return Ok(text.clone()),
            Behavior::Fail(message) => return Err(LLMError::ApiError(message.clone())),
            Behavior::Slow(delay) => *delay,
        };

        match tokio::time::timeout(timeout, tokio::time::sleep(delay)).await {
            Ok(()) => Ok("late reply".to_string()),
            Err(_) => Err(LLMError::Timeout(timeout)),
        }
    }
}

// ============================================================================
// Cache fakes
// ============================================================================

/// Store whose every operation fails, as if Redis were unreachable
pub struct UnreachableCache;

#[async_trait]
impl CacheStore for UnreachableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<String>, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }
}

// ============================================================================
// Queue fake
// ============================================================================

pub enum QueueEvent {
    Message(QueueMessage),
    PartitionEof(i32),
    Transport(String),
}

impl QueueEvent {
    pub fn text(text: &str) -> Self {
        Self::Message(QueueMessage::new(text.as_bytes().to_vec()))
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        Self::Message(QueueMessage::new(bytes.to_vec()))
    }

    /// Message with no payload at all
    pub fn tombstone() -> Self {
        Self::Message(QueueMessage { payload: None, partition: 0, offset: 0 })
    }
}

/// Scripted queue; once the script is drained every poll waits out its timeout
pub struct FakeQueue {
    events: VecDeque<QueueEvent>,
    closed: Arc<AtomicBool>,
}

impl FakeQueue {
    pub fn new(events: Vec<QueueEvent>) -> Self {
        Self { events: events.into(), closed: Arc::new(AtomicBool::new(false)) }
    }

    pub fn closed_handle(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

#[async_trait]
impl QueueSource for FakeQueue {
    async fn poll(&mut self, timeout: Duration) -> Result<Option<QueueMessage>, QueueError> {
        match self.events.pop_front() {
            Some(QueueEvent::Message(message)) => Ok(Some(message)),
            Some(QueueEvent::PartitionEof(partition)) => Err(QueueError::PartitionEof { partition }),
            Some(QueueEvent::Transport(message)) => Err(QueueError::Transport(message)),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            },
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Wiring helpers
// ============================================================================

pub fn processor_with(
    cache: Arc<dyn CacheStore>,
    completion: Arc<dyn CompletionService>,
    cache_ttl: Duration,
) -> ErrorProcessor {
    ErrorProcessor::new(
        cache,
        completion,
        ProcessorSettings {
            key_prefix: TEST_PREFIX.to_string(),
            cache_ttl,
            completion_timeout: TEST_TIMEOUT,
        },
    )
}

pub fn app_state_with(
    cache: Arc<dyn CacheStore>,
    completion: Arc<dyn CompletionService>,
) -> Arc<AppState> {
    let history_service = Arc::new(HistoryService::new(cache, TEST_PREFIX));
    let analytics_service =
        Arc::new(AnalyticsService::new(Arc::clone(&history_service), completion, TEST_TIMEOUT));
    Arc::new(AppState { history_service, analytics_service })
}

pub fn memory_cache() -> Arc<MemoryCacheStore> {
    Arc::new(MemoryCacheStore::new())
}
