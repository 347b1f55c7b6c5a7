//! Structures to realise an event-driven service architecture
//!
//! Services have no knowledge of each other. Whenever something of relevance to other
//! services happens, a [`Notification`] is published to the topic described by its
//! [`QueueDescriptor`]. Every interested party may then subscribe to that topic and
//! process the notifications.
//!
//! Notifications are consumed in a resilient way using
//! [`ConsumerGroups`](ConsumerGroupDescriptor). Messages are stored in a log-like data
//! structure by the broker and each consumed entry has to be acknowledged once
//! processing concludes. Upon crashing, the group resumes from the last acknowledged
//! entry, thus entries are delivered at least once and handlers have to be idempotent.
//!
//! Multiple consumers may share a group. The broker then assigns every partition of the
//! topic to only one of them, effectively implementing load balancing while preserving
//! the order of entries which share a partitioning key.

mod consumer;
mod consumer_group;
mod notification;
mod publisher;
mod queue;
mod queue_provider;

pub use consumer::*;
pub use consumer_group::*;
pub use notification::*;
pub use publisher::*;
pub use queue::*;
pub use queue_provider::*;
