//! Publishes messages onto the broker
//!
//! Two modules live in here. The [`Producer`] sends a free-form JSON payload (or a demo
//! message) to the demo topic. The [`Emitter`] announces a single student change, the way
//! the owner of the records does after writing to its database.

mod client;
mod options;

use crate::constants::{DEMO_EVENT, DEMO_TOPIC};
use crate::domain::event::{EventKind, StudentChangeNotification};
use crate::domain::StudentIdentifier;
use crate::harness::{DeathReason, Heart, Module};
use crate::library::communication::event::{DeliveryMode, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::info;

pub use client::ProducerClient;
pub use options::{EmitOptions, Options};

#[derive(Debug, Error)]
enum ProducerError {
    #[error("invalid JSON payload")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("an id is required for {0} events")]
    MissingId(EventKind),
}

fn delivery_mode(asynchronous: bool) -> DeliveryMode {
    if asynchronous {
        DeliveryMode::Async
    } else {
        DeliveryMode::Sync
    }
}

/// Module sending a single free-form payload
pub struct Producer<F> {
    options: Options,
    factory: F,
    body: Value,
}

impl<F> Producer<F>
where
    F: CommunicationFactory + Send + Sync,
{
    /// Creates a new instance from raw parts
    pub fn new(options: Options, factory: F) -> Self {
        Self {
            options,
            factory,
            body: Value::Null,
        }
    }

    fn demo_body(&self) -> Value {
        json!({
            "event": DEMO_EVENT,
            "message": "Belajar Apache Kafka",
            "producer": self.options.producer.app_name,
            "sent_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        })
    }
}

#[async_trait]
impl<F> Module for Producer<F>
where
    F: CommunicationFactory + Send + Sync,
{
    async fn pre_startup(&mut self) -> EmptyResult {
        self.body = match &self.options.payload {
            Some(payload) => serde_json::from_str(payload).map_err(ProducerError::InvalidPayload)?,
            None => self.demo_body(),
        };

        Ok(())
    }

    async fn run(&mut self, _heart: Heart) -> Result<Option<DeathReason>, BoxedError> {
        let client = ProducerClient::new(
            self.factory.notification_publisher()?,
            &self.options.producer.app_name,
            delivery_mode(self.options.producer.asynchronous),
        );

        let correlation_id = client
            .publish_payload(QueueDescriptor::new(DEMO_TOPIC), &self.body)
            .await?;
        client.flush().await?;

        info!(topic = DEMO_TOPIC, %correlation_id, "Message published");

        Ok(None)
    }
}

/// Module announcing a single student change
pub struct Emitter<F> {
    options: EmitOptions,
    factory: F,
}

impl<F> Emitter<F>
where
    F: CommunicationFactory + Send + Sync,
{
    /// Creates a new instance from raw parts
    pub fn new(options: EmitOptions, factory: F) -> Self {
        Self { options, factory }
    }

    fn notification(&self) -> Result<StudentChangeNotification, ProducerError> {
        let id = match (&self.options.id, &self.options.event) {
            (Some(id), _) => StudentIdentifier::from(id.as_str()),
            (None, EventKind::Created) => StudentIdentifier::generate(),
            (None, kind) => return Err(ProducerError::MissingId(kind.clone())),
        };

        if self.options.event == EventKind::Deleted {
            return Ok(StudentChangeNotification::deleted(&id));
        }

        // Flags left out keep their current value on the replicas
        let mut data = Map::new();
        data.insert("id".into(), Value::String(id.to_string()));

        let attributes = [
            ("nim", &self.options.nim),
            ("name", &self.options.name),
            ("email", &self.options.email),
            ("address", &self.options.address),
        ];

        for (attribute, value) in attributes {
            if let Some(value) = value {
                data.insert(attribute.into(), Value::String(value.clone()));
            }
        }

        Ok(StudentChangeNotification::new(self.options.event.clone(), data))
    }
}

#[async_trait]
impl<F> Module for Emitter<F>
where
    F: CommunicationFactory + Send + Sync,
{
    async fn run(&mut self, _heart: Heart) -> Result<Option<DeathReason>, BoxedError> {
        let notification = self.notification()?;
        let client = ProducerClient::new(
            self.factory.notification_publisher()?,
            &self.options.producer.app_name,
            delivery_mode(self.options.producer.asynchronous),
        );

        let correlation_id = client.publish_change(&notification).await?;
        client.flush().await?;

        info!(
            event = %notification.event,
            id = ?notification.id(),
            %correlation_id,
            "Change event published"
        );

        Ok(None)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::constants::headers;
    use crate::harness::ModuleRunner;
    use crate::library::communication::implementation::mock::MockCommunicationFactory;
    use crate::module::options::{BrokerOptions, ProducerOptions};
    use std::time::Duration;

    fn producer_options(asynchronous: bool) -> ProducerOptions {
        ProducerOptions {
            app_name: "akademik".into(),
            delivery_timeout: Duration::from_secs(5),
            asynchronous,
        }
    }

    fn produce_options(payload: Option<&str>) -> Options {
        Options {
            broker: BrokerOptions {
                brokers: "localhost:9092".into(),
            },
            producer: producer_options(false),
            payload: payload.map(str::to_owned),
        }
    }

    fn emit_options(event: EventKind, id: Option<&str>) -> EmitOptions {
        EmitOptions {
            broker: BrokerOptions {
                brokers: "localhost:9092".into(),
            },
            producer: producer_options(true),
            event,
            id: id.map(str::to_owned),
            nim: Some("2201".into()),
            name: Some("Ani".into()),
            email: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn publish_demo_payload_by_default() {
        let factory = MockCommunicationFactory::default();

        let reason = ModuleRunner::default()
            .run(Producer::new(produce_options(None), factory.clone()))
            .await;

        assert_eq!(reason.exit_code(), 0);
        let (message, _) = factory.broker().published().remove(0);
        let body: Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(message.queue.key(), DEMO_TOPIC);
        assert_eq!(body["event"], DEMO_EVENT);
        assert_eq!(body["producer"], "akademik");
    }

    #[tokio::test]
    async fn publish_custom_payload() {
        let factory = MockCommunicationFactory::default();

        ModuleRunner::default()
            .run(Producer::new(produce_options(Some(r#"{"hello": 1}"#)), factory.clone()))
            .await;

        let (message, _) = factory.broker().published().remove(0);
        let body: Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(body, json!({"hello": 1}));
    }

    #[tokio::test]
    async fn refuse_invalid_payloads() {
        let factory = MockCommunicationFactory::default();

        let reason = ModuleRunner::default()
            .run(Producer::new(produce_options(Some("{oops")), factory.clone()))
            .await;

        assert_eq!(reason.exit_code(), 1);
        assert!(factory.broker().published().is_empty());
    }

    #[tokio::test]
    async fn emit_creation_with_generated_id() {
        let factory = MockCommunicationFactory::default();

        let reason = ModuleRunner::default()
            .run(Emitter::new(emit_options(EventKind::Created, None), factory.clone()))
            .await;

        assert_eq!(reason.exit_code(), 0);
        let (message, mode) = factory.broker().published().remove(0);
        let body: Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(mode, DeliveryMode::Async);
        assert_eq!(body["event"], "mahasiswa.created");
        assert_eq!(body["data"]["name"], "Ani");
        assert_eq!(body["data"]["id"], message.headers[headers::ID].as_str());
    }

    #[tokio::test]
    async fn announce_only_given_attributes() {
        let factory = MockCommunicationFactory::default();

        ModuleRunner::default()
            .run(Emitter::new(emit_options(EventKind::Updated, Some("u-1")), factory.clone()))
            .await;

        let (message, _) = factory.broker().published().remove(0);
        let body: Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(body["data"], json!({"id": "u-1", "nim": "2201", "name": "Ani"}));
    }

    #[tokio::test]
    async fn require_id_for_deletions() {
        let factory = MockCommunicationFactory::default();

        let reason = ModuleRunner::default()
            .run(Emitter::new(emit_options(EventKind::Deleted, None), factory.clone()))
            .await;

        assert_eq!(reason.exit_code(), 1);
        assert!(factory.broker().published().is_empty());
    }
}
