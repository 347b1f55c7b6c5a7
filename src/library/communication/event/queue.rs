use crate::library::EmptyResult;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Headers attached to a message on the wire
///
/// Values that are not valid UTF-8 are converted lossily when receiving.
pub type MessageHeaders = BTreeMap<String, String>;

/// Describes a notification queue (a topic in broker terms)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueDescriptor {
    key: String,
}

impl QueueDescriptor {
    /// Creates a new instance from raw parts
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Value used by queue implementations to identify the queue
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Location within the queue where a new consumer group starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueLocation {
    /// Oldest entry still retained by the broker
    Head,
    /// Only entries published after the group has been created
    Tail,
}

/// Transport information of a received entry
///
/// It is not part of the notification itself and is intended for logging and tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Topic the entry has been read from
    pub topic: String,
    /// Partition within the topic
    pub partition: i32,
    /// Position within the partition
    pub offset: i64,
    /// Partitioning key, if one has been set by the publisher
    pub key: Option<String>,
    /// Headers set by the publisher
    pub headers: MessageHeaders,
}

/// Entry retrieved from a [`Queue`](QueueDescriptor) providing a raw payload
#[async_trait]
pub trait RawQueueEntry {
    /// Payload of the item
    fn payload(&self) -> &[u8];

    /// Transport information of the item
    fn metadata(&self) -> &EntryMetadata;

    /// Marks the item as processed so that its position is committed
    async fn acknowledge(&mut self) -> EmptyResult;
}
