use super::MockBroker;
use crate::library::communication::{BrokerError, CommunicationFactory};

/// [`CommunicationFactory`] handing out clones of a single [`MockBroker`]
#[derive(Clone, Default)]
pub struct MockCommunicationFactory {
    broker: MockBroker,
}

impl MockCommunicationFactory {
    /// Broker shared by all handed out implementations
    pub fn broker(&self) -> &MockBroker {
        &self.broker
    }
}

impl CommunicationFactory for MockCommunicationFactory {
    type QueueProvider = MockBroker;
    type NotificationPublisher = MockBroker;

    fn queue_provider(&self) -> Self::QueueProvider {
        self.broker.clone()
    }

    fn notification_publisher(&self) -> Result<Self::NotificationPublisher, BrokerError> {
        Ok(self.broker.clone())
    }
}
