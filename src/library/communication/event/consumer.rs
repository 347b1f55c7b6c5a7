use super::{EntryMetadata, RawQueueEntry};
use crate::library::reporting::ErrorReporter;
use crate::library::EmptyResult;
use async_trait::async_trait;
use tracing::{trace, warn};

/// Entity which may consume and process raw queue entries
#[async_trait]
pub trait Consumer {
    /// Name of the consumer displayed in log messages and error reports
    const NAME: &'static str;

    /// Processes an entry and returns whether it succeeded or failed
    ///
    /// Entries which can not be processed but do not indicate a failure (e.g. malformed or
    /// irrelevant ones) should be logged and reported as success.
    async fn consume(&self, payload: &[u8], metadata: &EntryMetadata) -> EmptyResult;
}

/// Helper functions to aid the consumption of entries
#[async_trait]
pub trait ConsumerExt {
    /// Processes a single entry, hands failures to the reporter and acknowledges the entry
    /// regardless of the outcome so that one poisoned entry can not halt the queue.
    async fn consume_entry<E, R>(&self, entry: &mut E, reporter: &R)
    where
        E: RawQueueEntry + Send + Sync,
        R: ErrorReporter + Send + Sync;
}

#[async_trait]
impl<C> ConsumerExt for C
where
    C: Consumer + Send + Sync,
{
    async fn consume_entry<E, R>(&self, entry: &mut E, reporter: &R)
    where
        E: RawQueueEntry + Send + Sync,
        R: ErrorReporter + Send + Sync,
    {
        if let Err(error) = self.consume(entry.payload(), entry.metadata()).await {
            reporter.report(C::NAME, &*error);
        }

        let metadata = entry.metadata();
        let (topic, partition, offset) =
            (metadata.topic.clone(), metadata.partition, metadata.offset);

        match entry.acknowledge().await {
            Ok(_) => trace!(%topic, partition, offset, "Acknowledged entry"),
            Err(error) => warn!(%topic, partition, offset, %error, "Failed to acknowledge entry"),
        }
    }
}
