use crate::library::communication::event::{
    NotificationPublisher, QueueProvider, RawNotificationPublisher,
};
use crate::library::communication::BrokerError;

/// Factory to provide implementations for the traits from this module
///
/// Services receive a factory instead of reaching for a process-wide client so that
/// the broker may be replaced by a test double.
pub trait CommunicationFactory {
    /// [`QueueProvider`] implementation type
    type QueueProvider: QueueProvider + Send + Sync;
    /// [`NotificationPublisher`] implementation type
    type NotificationPublisher: NotificationPublisher + RawNotificationPublisher + Send + Sync;

    /// Instantiates a new [`QueueProvider`]
    fn queue_provider(&self) -> Self::QueueProvider;

    /// Instantiates a new [`NotificationPublisher`]
    fn notification_publisher(&self) -> Result<Self::NotificationPublisher, BrokerError>;
}
