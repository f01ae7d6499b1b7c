//! Kafka queue source built on rdkafka's StreamConsumer.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use std::time::Duration;

use super::{QueueError, QueueMessage, QueueSource};
use crate::config::KafkaConfig;

pub struct KafkaQueueSource {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaQueueSource {
    /// Create the consumer and subscribe to the configured topic
    pub fn connect(config: &KafkaConfig) -> Result<Self, QueueError> {
        let consumer: StreamConsumer = client_config(config)
            .create()
            .map_err(|e| QueueError::Config(e.to_string()))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| QueueError::Subscribe(e.to_string()))?;

        tracing::info!(
            "Kafka consumer subscribed to topic '{}' (group: {}, servers: {})",
            config.topic,
            config.group_id,
            config.bootstrap_servers
        );

        Ok(Self { consumer, topic: config.topic.clone() })
    }
}

/// Consumer settings: earliest offset reset, partition EOF reporting, and
/// SASL credentials when configured
fn client_config(config: &KafkaConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("group.id", &config.group_id)
        .set("auto.offset.reset", &config.auto_offset_reset)
        .set("enable.partition.eof", "true")
        .set("security.protocol", config.effective_security_protocol());

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client
            .set("sasl.mechanism", &config.sasl_mechanism)
            .set("sasl.username", username)
            .set("sasl.password", password);
    }

    client
}

#[async_trait]
impl QueueSource for KafkaQueueSource {
    async fn poll(&mut self, timeout: Duration) -> Result<Option<QueueMessage>, QueueError> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_elapsed) => Ok(None),
            Ok(Ok(message)) => Ok(Some(QueueMessage {
                payload: message.payload().map(<[u8]>::to_vec),
                partition: message.partition(),
                offset: message.offset(),
            })),
            Ok(Err(KafkaError::PartitionEOF(partition))) => {
                Err(QueueError::PartitionEof { partition })
            },
            Ok(Err(e)) => Err(QueueError::Transport(e.to_string())),
        }
    }

    fn close(&mut self) {
        self.consumer.unsubscribe();
        tracing::info!("Kafka consumer unsubscribed from topic '{}'", self.topic);
    }
}
