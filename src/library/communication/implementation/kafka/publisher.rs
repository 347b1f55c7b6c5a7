use super::super::json::JsonNotificationPublisher;
use super::{broker_error, FLUSH_TIMEOUT};
use crate::library::communication::event::{
    DeliveryMode, OutgoingMessage, RawNotificationPublisher,
};
use crate::library::communication::{BrokerError, PublishError};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Duration;
use tracing::{trace, warn};

/// Kafka based implementation of the [`RawNotificationPublisher`] trait
#[derive(Clone)]
pub struct KafkaNotificationPublisher {
    producer: FutureProducer,
    delivery_timeout: Duration,
}

impl KafkaNotificationPublisher {
    /// Creates a new producer client
    ///
    /// The client connects lazily, failures to reach the cluster surface on the first publish.
    pub fn new(
        brokers: &str,
        client_id: &str,
        delivery_timeout: Duration,
    ) -> Result<Self, BrokerError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", client_id)
            .set("message.timeout.ms", delivery_timeout.as_millis().to_string())
            .create()
            .map_err(broker_error)?;

        Ok(Self {
            producer,
            delivery_timeout,
        })
    }
}

fn record_headers(message: &OutgoingMessage) -> OwnedHeaders {
    message
        .headers
        .iter()
        .fold(OwnedHeaders::new(), |headers, (key, value)| {
            headers.insert(Header {
                key,
                value: Some(value.as_str()),
            })
        })
}

#[async_trait]
impl RawNotificationPublisher for KafkaNotificationPublisher {
    async fn publish_raw(
        &self,
        message: OutgoingMessage,
        mode: DeliveryMode,
    ) -> Result<(), PublishError> {
        let topic = message.queue.key().to_owned();
        let mut record: FutureRecord<str, [u8]> = FutureRecord::to(&topic)
            .payload(message.payload.as_slice())
            .headers(record_headers(&message));

        if let Some(key) = &message.key {
            record = record.key(key.as_str());
        }

        match mode {
            DeliveryMode::Sync => {
                let (partition, offset) = self
                    .producer
                    .send(record, self.delivery_timeout)
                    .await
                    .map_err(|(error, _)| PublishError::Rejected(topic.clone(), error.into()))?;

                trace!(%topic, partition, offset, "Message delivered");
            }
            DeliveryMode::Async => {
                let delivery = self
                    .producer
                    .send_result(record)
                    .map_err(|(error, _)| PublishError::Rejected(topic.clone(), error.into()))?;

                tokio::spawn(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => {
                            trace!(%topic, partition, offset, "Message delivered")
                        }
                        Ok(Err((error, _))) => warn!(%topic, %error, "Message delivery failed"),
                        Err(_) => warn!(%topic, "Message delivery report was dropped"),
                    }
                });
            }
        }

        Ok(())
    }

    async fn flush(&self) -> Result<(), PublishError> {
        let producer = self.producer.clone();

        tokio::task::spawn_blocking(move || producer.flush(FLUSH_TIMEOUT))
            .await
            .map_err(|e| PublishError::Unavailable(BrokerError::Connection(e.into())))?
            .map_err(|e| PublishError::Unavailable(broker_error(e)))
    }
}

impl JsonNotificationPublisher for KafkaNotificationPublisher {}
