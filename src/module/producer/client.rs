use crate::constants::headers as header;
use crate::domain::event::StudentChangeNotification;
use crate::library::communication::event::{
    DeliveryMode, MessageHeaders, NotificationPublisher, OutgoingMessage, QueueDescriptor,
    RawNotificationPublisher,
};
use crate::library::communication::PublishError;
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Publishes messages tagged with the headers every consumer expects
///
/// Each message receives a fresh `correlation_id` and the `app` name. Change events
/// additionally carry the `id` of the affected record, which also serves as their
/// partitioning key so that all changes of one record keep their order.
pub struct ProducerClient<P> {
    publisher: P,
    app: String,
    mode: DeliveryMode,
}

impl<P> ProducerClient<P>
where
    P: NotificationPublisher + RawNotificationPublisher + Send + Sync,
{
    /// Creates a new instance which publishes in the given mode
    pub fn new(publisher: P, app: impl Into<String>, mode: DeliveryMode) -> Self {
        Self {
            publisher,
            app: app.into(),
            mode,
        }
    }

    fn headers(&self, correlation_id: &str) -> MessageHeaders {
        let mut headers = MessageHeaders::new();
        headers.insert(header::CORRELATION_ID.into(), correlation_id.into());
        headers.insert(header::APP.into(), self.app.clone());
        headers
    }

    /// Publishes an arbitrary JSON body keyed by its correlation id, returns the latter
    #[instrument(skip(self, queue, body), fields(topic = queue.key()))]
    pub async fn publish_payload(
        &self,
        queue: QueueDescriptor,
        body: &Value,
    ) -> Result<String, PublishError> {
        let correlation_id = Uuid::new_v4().to_string();

        let message = OutgoingMessage {
            queue,
            payload: serde_json::to_vec(body)?,
            headers: self.headers(&correlation_id),
            key: Some(correlation_id.clone()),
        };

        self.publisher.publish_raw(message, self.mode).await?;
        debug!(%correlation_id, mode = ?self.mode, "Payload handed to broker");

        Ok(correlation_id)
    }

    /// Publishes a change event keyed by the affected record id, returns the correlation id
    #[instrument(skip(self, notification), fields(event = %notification.event))]
    pub async fn publish_change(
        &self,
        notification: &StudentChangeNotification,
    ) -> Result<String, PublishError> {
        let correlation_id = Uuid::new_v4().to_string();
        let mut headers = self.headers(&correlation_id);
        let id = notification.id();

        if let Some(id) = &id {
            headers.insert(header::ID.into(), id.to_string());
        }

        self.publisher
            .publish(
                notification,
                headers,
                id.map(|id| id.to_string()),
                self.mode,
            )
            .await?;
        debug!(%correlation_id, mode = ?self.mode, "Change event handed to broker");

        Ok(correlation_id)
    }

    /// Waits for outstanding deliveries
    pub async fn flush(&self) -> Result<(), PublishError> {
        self.publisher.flush().await
    }
}
