use super::{KafkaNotificationPublisher, KafkaQueueProvider};
use crate::library::communication::{BrokerError, CommunicationFactory};
use std::time::Duration;

/// [`CommunicationFactory`] implementation for Kafka clusters
#[derive(Debug, Clone)]
pub struct KafkaCommunicationFactory {
    brokers: String,
    client_id: String,
    delivery_timeout: Duration,
}

impl KafkaCommunicationFactory {
    /// Creates a new factory connecting to a comma separated list of `host:port` pairs
    pub fn new(brokers: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            client_id: client_id.into(),
            delivery_timeout: Duration::from_secs(30),
        }
    }

    /// Upper bound for synchronous publishes to wait for the delivery report
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }
}

impl CommunicationFactory for KafkaCommunicationFactory {
    type QueueProvider = KafkaQueueProvider;
    type NotificationPublisher = KafkaNotificationPublisher;

    fn queue_provider(&self) -> Self::QueueProvider {
        KafkaQueueProvider::new(self.brokers.clone())
    }

    fn notification_publisher(&self) -> Result<Self::NotificationPublisher, BrokerError> {
        KafkaNotificationPublisher::new(&self.brokers, &self.client_id, self.delivery_timeout)
    }
}
