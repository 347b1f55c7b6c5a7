//! Replicates student records by consuming their change events
//!
//! The module joins the configured consumer group on the student topic and applies every
//! event to a local SQLite database. Malformed and foreign events are skipped, failures to
//! apply an event are reported without halting consumption. Transient unavailability of the
//! group coordinator is bridged by a bounded number of reconnects.

mod options;
mod services;
mod storage;

use crate::domain::event::StudentChangeNotification;
use crate::harness::{ConsumerSupervisor, DeathReason, Heart, Module, StopReason};
use crate::library::communication::event::{
    ConsumerGroupDescriptor, Notification, QueueLocation,
};
use crate::library::communication::CommunicationFactory;
use crate::library::reporting::TracingErrorReporter;
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use services::SyncService;
use thiserror::Error;
use tracing::info;

pub use options::Options;
pub use storage::SqliteRecordStore;

#[derive(Debug, Error)]
enum ReplicatorError {
    #[error("record store has not been opened")]
    StoreUnavailable,
}

/// Module implementation
pub struct Replicator<F> {
    options: Options,
    factory: F,
    store: Option<SqliteRecordStore>,
}

impl<F> Replicator<F>
where
    F: CommunicationFactory + Send + Sync,
{
    /// Creates a new instance from raw parts
    pub fn new(options: Options, factory: F) -> Self {
        Self {
            options,
            factory,
            store: None,
        }
    }

    /// Record store opened during startup
    pub fn store(&self) -> Option<&SqliteRecordStore> {
        self.store.as_ref()
    }
}

#[async_trait]
impl<F> Module for Replicator<F>
where
    F: CommunicationFactory + Send + Sync,
{
    async fn pre_startup(&mut self) -> EmptyResult {
        self.store = Some(SqliteRecordStore::connect(&self.options.database.url).await?);
        Ok(())
    }

    async fn run(&mut self, heart: Heart) -> Result<Option<DeathReason>, BoxedError> {
        let store = self
            .store
            .clone()
            .ok_or(ReplicatorError::StoreUnavailable)?;

        let consumer = self.options.group.consumer_id();
        let group = ConsumerGroupDescriptor::new(&self.options.group.group_id, QueueLocation::Head);
        let queue = StudentChangeNotification::queue();

        info!(topic = queue.key(), group = group.identifier(), %consumer, "Starting replication");

        let supervisor =
            ConsumerSupervisor::new(self.factory.queue_provider(), queue, group, consumer);
        let service = SyncService::new(store);

        match supervisor.run(&service, &TracingErrorReporter, heart).await? {
            StopReason::Terminated(reason) => Ok(Some(reason)),
            StopReason::StreamEnded => Ok(None),
        }
    }
}
