//! Queue Source
//!
//! Subscribe-by-topic message source polled with a bounded wait.

mod kafka;

pub use kafka::KafkaQueueSource;

use async_trait::async_trait;
use std::time::Duration;

/// One message pulled from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Raw bytes; `None` for tombstones
    pub payload: Option<Vec<u8>>,
    pub partition: i32,
    pub offset: i64,
}

impl QueueMessage {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self { payload: Some(payload.into()), partition: 0, offset: 0 }
    }
}

/// Queue errors
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Consumer reached the current end of a partition; not a failure
    #[error("End of partition {partition} reached")]
    PartitionEof { partition: i32 },

    #[error("Queue configuration error: {0}")]
    Config(String),

    #[error("Queue subscribe error: {0}")]
    Subscribe(String),

    #[error("Queue transport error: {0}")]
    Transport(String),
}

impl QueueError {
    pub fn is_partition_eof(&self) -> bool {
        matches!(self, Self::PartitionEof { .. })
    }
}

#[async_trait]
pub trait QueueSource: Send {
    /// Wait up to `timeout` for the next message.
    ///
    /// `Ok(None)` means nothing arrived within the wait.
    async fn poll(&mut self, timeout: Duration) -> Result<Option<QueueMessage>, QueueError>;

    /// Release the subscription; called once when the consumer stops
    fn close(&mut self);
}
