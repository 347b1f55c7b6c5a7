use super::super::json::JsonNotificationPublisher;
use crate::library::communication::event::{
    ConsumerGroupDescriptor, DeliveryMode, EntryMetadata, MessageHeaders, OutgoingMessage,
    QueueDescriptor, QueueLocation, QueueProvider, RawNotificationPublisher, RawQueueEntry,
};
use crate::library::communication::{BrokerError, PublishError};
use crate::library::EmptyResult;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

#[derive(Clone, Debug)]
struct StoredMessage {
    payload: Vec<u8>,
    key: Option<String>,
    headers: MessageHeaders,
}

#[derive(Default)]
struct BrokerState {
    topics: HashMap<String, Vec<StoredMessage>>,
    committed: HashMap<(String, String), i64>,
    connection_failures: VecDeque<BrokerError>,
    stream_failures: VecDeque<BrokerError>,
    connection_attempts: Vec<Instant>,
    acknowledged: Vec<(String, i64)>,
    published: Vec<(OutgoingMessage, DeliveryMode)>,
    publish_failures: VecDeque<String>,
}

/// Shared in-memory broker, clones operate on the same topics
#[derive(Clone, Default)]
pub struct MockBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl MockBroker {
    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap()
    }

    /// Appends an opaque body to a topic as if another service had published it
    pub fn push_raw(&self, topic: &str, payload: impl Into<Vec<u8>>, headers: MessageHeaders) {
        self.state()
            .topics
            .entry(topic.to_owned())
            .or_default()
            .push(StoredMessage {
                payload: payload.into(),
                key: None,
                headers,
            });
    }

    /// Lets the next connection attempt fail with the given error
    pub fn fail_next_connection(&self, error: BrokerError) -> &Self {
        self.state().connection_failures.push_back(error);
        self
    }

    /// Lets the next established stream break down with the given error after
    /// delivering all pending messages
    pub fn fail_next_stream(&self, error: BrokerError) -> &Self {
        self.state().stream_failures.push_back(error);
        self
    }

    /// Lets the next publish be rejected with the given reason
    pub fn reject_next_publish(&self, reason: &str) -> &Self {
        self.state().publish_failures.push_back(reason.to_owned());
        self
    }

    /// Points in time at which consumers tried to connect
    pub fn connection_attempts(&self) -> Vec<Instant> {
        self.state().connection_attempts.clone()
    }

    /// Topic and offset of every acknowledged entry in order
    pub fn acknowledged(&self) -> Vec<(String, i64)> {
        self.state().acknowledged.clone()
    }

    /// Every message handed over by a publisher in order
    pub fn published(&self) -> Vec<(OutgoingMessage, DeliveryMode)> {
        self.state().published.clone()
    }

    fn acknowledge(&self, group: &str, topic: &str, offset: i64) {
        let mut state = self.state();
        state.acknowledged.push((topic.to_owned(), offset));

        let committed = state
            .committed
            .entry((group.to_owned(), topic.to_owned()))
            .or_default();
        *committed = (*committed).max(offset + 1);
    }
}

/// Entry handed out by the [`MockBroker`]
pub struct MockQueueEntry {
    broker: MockBroker,
    group: String,
    payload: Vec<u8>,
    metadata: EntryMetadata,
}

#[async_trait]
impl RawQueueEntry for MockQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        self.broker
            .acknowledge(&self.group, &self.metadata.topic, self.metadata.offset);
        Ok(())
    }
}

#[async_trait]
impl QueueProvider for MockBroker {
    type Entry = MockQueueEntry;

    /// Streams all messages past the committed position of the group and ends afterwards
    async fn consume(
        &self,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        _consumer: &str,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BrokerError>>, BrokerError> {
        let mut state = self.state();
        state.connection_attempts.push(Instant::now());

        if let Some(error) = state.connection_failures.pop_front() {
            return Err(error);
        }

        let topic = queue.key().to_owned();
        let messages = state.topics.get(&topic).cloned().unwrap_or_default();
        let start = match state
            .committed
            .get(&(group.identifier().to_owned(), topic.clone()))
        {
            Some(offset) => *offset,
            None => match group.start() {
                QueueLocation::Head => 0,
                QueueLocation::Tail => messages.len() as i64,
            },
        };

        let mut items: Vec<Result<MockQueueEntry, BrokerError>> = messages
            .into_iter()
            .enumerate()
            .skip(start.max(0) as usize)
            .map(|(offset, message)| {
                Ok(MockQueueEntry {
                    broker: self.clone(),
                    group: group.identifier().to_owned(),
                    payload: message.payload,
                    metadata: EntryMetadata {
                        topic: topic.clone(),
                        partition: 0,
                        offset: offset as i64,
                        key: message.key,
                        headers: message.headers,
                    },
                })
            })
            .collect();

        if let Some(error) = state.stream_failures.pop_front() {
            items.push(Err(error));
        }

        Ok(stream::iter(items).boxed())
    }
}

#[async_trait]
impl RawNotificationPublisher for MockBroker {
    async fn publish_raw(
        &self,
        message: OutgoingMessage,
        mode: DeliveryMode,
    ) -> Result<(), PublishError> {
        let mut state = self.state();

        if let Some(reason) = state.publish_failures.pop_front() {
            return Err(PublishError::Rejected(
                message.queue.key().to_owned(),
                reason.into(),
            ));
        }

        state
            .topics
            .entry(message.queue.key().to_owned())
            .or_default()
            .push(StoredMessage {
                payload: message.payload.clone(),
                key: message.key.clone(),
                headers: message.headers.clone(),
            });
        state.published.push((message, mode));

        Ok(())
    }
}

impl JsonNotificationPublisher for MockBroker {}

#[cfg(test)]
mod does {
    use super::*;
    use crate::library::communication::event::{Notification, NotificationPublisher};
    use futures::TryStreamExt;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Ping {
        value: u8,
    }

    impl Notification for Ping {
        fn queue() -> QueueDescriptor {
            QueueDescriptor::new("ping")
        }
    }

    fn group() -> ConsumerGroupDescriptor {
        ConsumerGroupDescriptor::new("testing", QueueLocation::Head)
    }

    #[tokio::test]
    async fn resume_after_acknowledged_position() {
        let broker = MockBroker::default();
        broker.push_raw("ping", "a", MessageHeaders::new());
        broker.push_raw("ping", "b", MessageHeaders::new());

        let queue = QueueDescriptor::new("ping");
        let mut entries: Vec<MockQueueEntry> = broker
            .consume(&queue, &group(), "c1")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        entries[0].acknowledge().await.unwrap();

        let remaining: Vec<MockQueueEntry> = broker
            .consume(&queue, &group(), "c1")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].payload(), b"b");
        assert_eq!(broker.acknowledged(), vec![("ping".to_owned(), 0)]);
    }

    #[tokio::test]
    async fn deliver_published_notifications() {
        let broker = MockBroker::default();
        broker
            .publish(&Ping { value: 7 }, MessageHeaders::new(), None, DeliveryMode::Sync)
            .await
            .unwrap();

        let entries: Vec<MockQueueEntry> = broker
            .consume(&Ping::queue(), &group(), "c1")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let ping: Ping = serde_json::from_slice(entries[0].payload()).unwrap();
        assert_eq!(ping, Ping { value: 7 });
    }

    #[tokio::test]
    async fn replay_scripted_failures() {
        let broker = MockBroker::default();
        broker.fail_next_connection(BrokerError::CoordinatorUnavailable("busy".into()));

        let queue = QueueDescriptor::new("ping");
        assert!(broker.consume(&queue, &group(), "c1").await.is_err());
        assert!(broker.consume(&queue, &group(), "c1").await.is_ok());
        assert_eq!(broker.connection_attempts().len(), 2);
    }
}
