use crate::library::communication::event::{EntryMetadata, MessageHeaders, RawQueueEntry};
use crate::library::EmptyResult;
use async_trait::async_trait;
use rdkafka::consumer::{Consumer as _, StreamConsumer};
use rdkafka::message::{Headers, Message, OwnedMessage};
use rdkafka::{Offset, TopicPartitionList};
use std::sync::Arc;

/// Kafka based implementation of the [`RawQueueEntry`] trait
///
/// Acknowledging an entry stores its offset, the actual commit happens periodically
/// in the background as long as `enable.auto.commit` is set.
pub struct KafkaQueueEntry {
    consumer: Arc<StreamConsumer>,
    message: OwnedMessage,
    metadata: EntryMetadata,
}

impl KafkaQueueEntry {
    pub(super) fn new(consumer: Arc<StreamConsumer>, message: OwnedMessage) -> Self {
        let metadata = EntryMetadata {
            topic: message.topic().to_owned(),
            partition: message.partition(),
            offset: message.offset(),
            key: message
                .key()
                .map(|key| String::from_utf8_lossy(key).into_owned()),
            headers: message.headers().map(collect_headers).unwrap_or_default(),
        };

        Self {
            consumer,
            message,
            metadata,
        }
    }
}

fn collect_headers<H: Headers>(headers: &H) -> MessageHeaders {
    headers
        .iter()
        .map(|header| {
            let value = header
                .value
                .map(|value| String::from_utf8_lossy(value).into_owned())
                .unwrap_or_default();

            (header.key.to_owned(), value)
        })
        .collect()
}

#[async_trait]
impl RawQueueEntry for KafkaQueueEntry {
    fn payload(&self) -> &[u8] {
        self.message.payload().unwrap_or_default()
    }

    fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        let mut positions = TopicPartitionList::new();
        positions.add_partition_offset(
            &self.metadata.topic,
            self.metadata.partition,
            Offset::Offset(self.metadata.offset + 1),
        )?;

        self.consumer.store_offsets(&positions)?;

        Ok(())
    }
}
