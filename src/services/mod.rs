pub mod analytics_service;
pub mod cache;
pub mod error_log_consumer;
pub mod error_processor;
pub mod history_service;
pub mod llm;
pub mod queue;

pub use analytics_service::AnalyticsService;
pub use cache::{CacheError, CacheStore, MemoryCacheStore, RedisCacheStore};
pub use error_log_consumer::{ErrorLogConsumer, LoopExit};
pub use error_processor::{ErrorProcessor, ProcessOutcome, ProcessorSettings};
pub use history_service::HistoryService;
pub use llm::{CompletionService, LLMClient, LLMError};
pub use queue::{KafkaQueueSource, QueueError, QueueMessage, QueueSource};
