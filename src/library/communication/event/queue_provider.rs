use super::{ConsumerGroupDescriptor, QueueDescriptor, RawQueueEntry};
use crate::library::communication::BrokerError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Allows consumption of notification queues using [consumer groups](ConsumerGroupDescriptor)
#[async_trait]
pub trait QueueProvider {
    /// Type of [`RawQueueEntry`] returned by the provider
    type Entry: RawQueueEntry + Send + Sync;

    /// Connects to the broker and subscribes to the given queue as a member of the group
    /// using `consumer` as the member identifier.
    ///
    /// Connection failures are reported through the outer result. Errors yielded by the
    /// stream indicate that the established connection broke down, the stream should be
    /// dropped afterwards.
    async fn consume(
        &self,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        consumer: &str,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BrokerError>>, BrokerError>;
}
