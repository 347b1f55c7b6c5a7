use super::{MessageHeaders, Notification, QueueDescriptor};
use crate::library::communication::PublishError;
use async_trait::async_trait;

/// Extent to which a publisher waits for the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Wait until the broker confirmed the delivery
    Sync,
    /// Return as soon as the message has been queued locally, delivery failures are only logged
    Async,
}

/// Serialized message ready to be handed to a broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Destination of the message
    pub queue: QueueDescriptor,
    /// Serialized body
    pub payload: Vec<u8>,
    /// Headers attached to the message
    pub headers: MessageHeaders,
    /// Partitioning key, messages sharing a key keep their relative order
    pub key: Option<String>,
}

/// Structure which allows publishing of serialized data into a queue
#[async_trait]
pub trait RawNotificationPublisher {
    /// Sends an opaque payload to the queue named in the message
    async fn publish_raw(
        &self,
        message: OutgoingMessage,
        mode: DeliveryMode,
    ) -> Result<(), PublishError>;

    /// Waits for all messages queued with [`DeliveryMode::Async`] to be delivered
    async fn flush(&self) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Publisher for [`Notifications`](Notification)
#[async_trait]
pub trait NotificationPublisher {
    /// Publishes a [`Notification`] to its designated queue
    async fn publish<N: Notification + Send + Sync>(
        &self,
        notification: &N,
        headers: MessageHeaders,
        key: Option<String>,
        mode: DeliveryMode,
    ) -> Result<(), PublishError>;
}
