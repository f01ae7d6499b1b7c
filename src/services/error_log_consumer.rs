//! Error Log Consumer
//!
//! Long-running loop draining the queue source into the error processor.
//! Messages are handled one at a time in poll order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::services::error_processor::ErrorProcessor;
use crate::services::queue::{QueueMessage, QueueSource};

/// Why the consumption loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The shutdown handle was set
    Shutdown,
    /// The queue reported a non-recoverable error
    TransportError(String),
}

/// Counters reported when the loop stops
#[derive(Debug, Default, Clone, Copy)]
struct ConsumerStats {
    received: u64,
    processed: u64,
    skipped: u64,
}

pub struct ErrorLogConsumer {
    processor: Arc<ErrorProcessor>,
    poll_timeout: Duration,
    shutdown: Arc<AtomicBool>,
    stats: ConsumerStats,
}

impl ErrorLogConsumer {
    pub fn new(processor: Arc<ErrorProcessor>, poll_timeout: Duration) -> Self {
        Self {
            processor,
            poll_timeout,
            shutdown: Arc::new(AtomicBool::new(false)),
            stats: ConsumerStats::default(),
        }
    }

    /// Get shutdown handle; setting it stops the loop within one poll timeout
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Run the loop on a dedicated tokio task
    pub fn spawn(self, source: Box<dyn QueueSource>) -> JoinHandle<LoopExit> {
        tokio::spawn(async move { self.run(source).await })
    }

    /// Poll until shutdown or a transport error. The source is closed on every exit path.
    pub async fn run(mut self, mut source: Box<dyn QueueSource>) -> LoopExit {
        info!("Error log consumer started (poll timeout: {:?})", self.poll_timeout);

        let exit = loop {
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Error log consumer is shutting down");
                break LoopExit::Shutdown;
            }

            match source.poll(self.poll_timeout).await {
                Ok(None) => continue,
                Ok(Some(message)) => self.handle_message(message).await,
                Err(e) if e.is_partition_eof() => {
                    info!("{}", e);
                },
                Err(e) => {
                    error!("Error consuming message: {}", e);
                    break LoopExit::TransportError(e.to_string());
                },
            }
        };

        source.close();
        info!(
            "Error log consumer stopped ({:?}): received={}, processed={}, skipped={}",
            exit, self.stats.received, self.stats.processed, self.stats.skipped
        );
        exit
    }

    async fn handle_message(&mut self, message: QueueMessage) {
        self.stats.received += 1;

        let Some(payload) = message.payload else {
            warn!(
                "Skipping tombstone message (partition={}, offset={})",
                message.partition, message.offset
            );
            self.stats.skipped += 1;
            return;
        };

        let error_log = match String::from_utf8(payload) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Skipping non-UTF-8 message (partition={}, offset={}): {}",
                    message.partition, message.offset, e
                );
                self.stats.skipped += 1;
                return;
            },
        };

        info!("Received message: {}", error_log);
        // the record is persisted by the processor
        let _ = self.processor.process(&error_log).await;
        self.stats.processed += 1;
    }
}
