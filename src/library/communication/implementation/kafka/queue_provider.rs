use super::{broker_error, KafkaQueueEntry, METADATA_TIMEOUT};
use crate::library::communication::event::{
    ConsumerGroupDescriptor, QueueDescriptor, QueueProvider,
};
use crate::library::communication::BrokerError;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer as _, StreamConsumer};
use rdkafka::types::RDKafkaErrorCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Queue provider implementation using Kafka consumer groups
#[derive(Debug, Clone)]
pub struct KafkaQueueProvider {
    brokers: String,
}

impl KafkaQueueProvider {
    /// Creates a new instance connecting to the given bootstrap servers
    pub fn new(brokers: String) -> Self {
        Self { brokers }
    }

    fn client_config(&self, group: &ConsumerGroupDescriptor, consumer: &str) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("client.id", consumer);

        for (key, value) in group.client_options() {
            config.set(key, value);
        }

        config
    }
}

/// Requests the topic metadata which forces the client to reach the cluster
async fn verify_topic(consumer: Arc<StreamConsumer>, topic: String) -> Result<(), BrokerError> {
    let name = topic.clone();
    let errors: Vec<RDKafkaErrorCode> = tokio::task::spawn_blocking(move || {
        consumer
            .fetch_metadata(Some(&name), METADATA_TIMEOUT)
            .map(|metadata| {
                metadata
                    .topics()
                    .iter()
                    .filter(|entry| entry.name() == name)
                    .filter_map(|entry| entry.error())
                    .map(RDKafkaErrorCode::from)
                    .collect()
            })
    })
    .await
    .map_err(|e| BrokerError::Connection(e.into()))?
    .map_err(broker_error)?;

    for code in errors {
        match code {
            RDKafkaErrorCode::UnknownTopicOrPartition
            | RDKafkaErrorCode::TopicAuthorizationFailed => {
                return Err(BrokerError::TopicUnavailable(topic, code.to_string()));
            }
            code => warn!(%topic, %code, "Topic metadata reported an error"),
        }
    }

    Ok(())
}

#[async_trait]
impl QueueProvider for KafkaQueueProvider {
    type Entry = KafkaQueueEntry;

    /// Consumes a topic using the following steps:
    ///
    /// 1. Create a client from the group options
    /// 2. Subscribe to the topic and request its metadata from the cluster
    /// 3. Stream messages one after another until the stream is dropped
    async fn consume(
        &self,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        consumer: &str,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BrokerError>>, BrokerError> {
        let client: StreamConsumer = self
            .client_config(group, consumer)
            .create()
            .map_err(broker_error)?;
        let client = Arc::new(client);

        client.subscribe(&[queue.key()]).map_err(broker_error)?;
        verify_topic(client.clone(), queue.key().to_owned()).await?;

        debug!(topic = queue.key(), group = group.identifier(), "Subscribed to topic");

        let entries = stream::unfold(client, |client| async move {
            let entry = match client.recv().await {
                Ok(message) => Ok(KafkaQueueEntry::new(client.clone(), message.detach())),
                Err(error) => Err(broker_error(error)),
            };

            Some((entry, client))
        });

        Ok(entries.boxed())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::library::communication::event::QueueLocation;

    #[test]
    fn carry_group_options_into_client_config() {
        let provider = KafkaQueueProvider::new("localhost:9092".into());
        let group = ConsumerGroupDescriptor::new("replicator", QueueLocation::Head);
        let config = provider.client_config(&group, "replicator-1");

        assert_eq!(config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(config.get("client.id"), Some("replicator-1"));
        assert_eq!(config.get("group.id"), Some("replicator"));
        assert_eq!(config.get("auto.offset.reset"), Some("earliest"));
        assert_eq!(config.get("session.timeout.ms"), Some("30000"));
        assert_eq!(config.get("enable.auto.offset.store"), Some("false"));
    }
}
