//! Serialization provided by [`serde_json`] using marker traits
//!
//! This module allows implementors of traits that provide raw access to underlying messaging systems
//! to also provide the higher-level traits relying on serialization. Implementing the marker trait
//! provides a default implementation of the higher-level trait which translates strongly typed data
//! into serialized bytes using [`serde_json`].

use super::super::event::{
    DeliveryMode, MessageHeaders, Notification, NotificationPublisher, OutgoingMessage,
    RawNotificationPublisher,
};
use crate::library::communication::PublishError;
use async_trait::async_trait;

/// Marker trait providing a default [`NotificationPublisher`] implementation based on [`serde_json`]
pub trait JsonNotificationPublisher: RawNotificationPublisher + Send + Sync {}

#[async_trait]
impl<P> NotificationPublisher for P
where
    P: JsonNotificationPublisher,
{
    /// Serializes the notification using [`serde_json::to_vec`]
    async fn publish<N: Notification + Send + Sync>(
        &self,
        notification: &N,
        headers: MessageHeaders,
        key: Option<String>,
        mode: DeliveryMode,
    ) -> Result<(), PublishError> {
        let message = OutgoingMessage {
            queue: N::queue(),
            payload: serde_json::to_vec(notification)?,
            headers,
            key,
        };

        self.publish_raw(message, mode).await
    }
}
