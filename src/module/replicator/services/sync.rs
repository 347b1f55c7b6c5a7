use crate::domain::event::decode;
use crate::domain::{ApplyOutcome, RecordStore, StudentApplier};
use crate::library::communication::event::{Consumer, EntryMetadata};
use crate::library::EmptyResult;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Applies student change events to the local record store
pub struct SyncService<S> {
    applier: StudentApplier<S>,
}

impl<S: RecordStore> SyncService<S> {
    pub fn new(store: S) -> Self {
        Self {
            applier: StudentApplier::new(store),
        }
    }
}

#[async_trait]
impl<S> Consumer for SyncService<S>
where
    S: RecordStore,
{
    const NAME: &'static str = "SyncService";

    async fn consume(&self, payload: &[u8], metadata: &EntryMetadata) -> EmptyResult {
        debug!(
            topic = %metadata.topic,
            partition = metadata.partition,
            offset = metadata.offset,
            key = ?metadata.key,
            "Processing entry"
        );

        let event = match decode(payload, &metadata.headers) {
            Ok(event) => event,
            Err(rejection) => {
                warn!(
                    reason = rejection.reason(),
                    event = ?rejection.event(),
                    topic = %metadata.topic,
                    headers = ?metadata.headers,
                    body = %String::from_utf8_lossy(payload),
                    "Discarding entry: {}",
                    rejection
                );

                return Ok(());
            }
        };

        match self.applier.apply(&event).await {
            Ok(ApplyOutcome::Ignored(tag)) => {
                info!(event = %tag, id = %event.id, "Event ignored");
            }
            Ok(outcome) => {
                info!(event = %event.kind, id = %event.id, %outcome, "Event applied");
            }
            Err(e) => {
                error!(event = %event.kind, id = %event.id, error = %e, "Failed to apply event");
                return Err(e.into());
            }
        }

        Ok(())
    }
}
