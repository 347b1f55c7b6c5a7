//! Long running consumption of a single queue with bounded reconnects
//!
//! A [`ConsumerSupervisor`] connects to the broker, feeds every entry to a [`Consumer`]
//! and reconnects after transient broker failures:
//!
//! - `Connecting` leads to `Polling` once the subscription succeeded
//! - `Polling` and `Connecting` lead to `Backoff` when the group coordinator is unavailable
//! - `Backoff` leads back to `Connecting` after a fixed delay or to `Failed` once all attempts are used up
//! - any other broker failure leads to `Failed`
//! - the end of the stream or the death of the [`Heart`] lead to `Stopped`
//!
//! Reconnects are limited over the lifetime of the supervisor, not per connection.

use super::{DeathReason, Heart};
use crate::constants::{CONNECT_ATTEMPTS, CONNECT_RETRY_DELAY};
use crate::library::communication::event::{
    Consumer, ConsumerExt, ConsumerGroupDescriptor, QueueDescriptor, QueueProvider,
};
use crate::library::communication::BrokerError;
use crate::library::helpers::Backoff;
use crate::library::reporting::ErrorReporter;
use futures::StreamExt;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle state of a [`ConsumerSupervisor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Establishing a connection and subscribing
    Connecting,
    /// Processing entries one after another
    Polling,
    /// Waiting before the next connection attempt
    Backoff,
    /// Terminated due to an unrecoverable failure
    Failed,
    /// Terminated gracefully
    Stopped,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Polling => "polling",
            Self::Backoff => "backoff",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        };

        f.write_str(name)
    }
}

/// Reason for a graceful stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Heart died while connecting, polling, or waiting
    Terminated(DeathReason),
    /// Broker closed the stream of entries
    StreamEnded,
}

/// Unrecoverable failure of a [`ConsumerSupervisor`]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Broker stayed unavailable for the given number of attempts
    #[error("broker unavailable after {0} connection attempts")]
    RetriesExhausted(u32, #[source] BrokerError),
    /// Broker failed in a way which can not be resolved by reconnecting
    #[error("broker connection failed permanently")]
    Fatal(#[source] BrokerError),
}

fn enter(state: SupervisorState) {
    match state {
        SupervisorState::Connecting | SupervisorState::Backoff => debug!(%state, "State changed"),
        SupervisorState::Failed => error!(%state, "State changed"),
        _ => info!(%state, "State changed"),
    }
}

/// Consumes a queue using a [`QueueProvider`] and reconnects after transient failures
pub struct ConsumerSupervisor<Q> {
    provider: Q,
    queue: QueueDescriptor,
    group: ConsumerGroupDescriptor,
    consumer: String,
    attempts: u32,
    retry_delay: Duration,
}

impl<Q> ConsumerSupervisor<Q>
where
    Q: QueueProvider + Send + Sync,
{
    /// Creates a new instance which consumes the queue as the given member of the group
    pub fn new(
        provider: Q,
        queue: QueueDescriptor,
        group: ConsumerGroupDescriptor,
        consumer: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            queue,
            group,
            consumer: consumer.into(),
            attempts: CONNECT_ATTEMPTS,
            retry_delay: CONNECT_RETRY_DELAY,
        }
    }

    /// Feeds entries to the consumer until the heart dies, the stream ends, or the
    /// broker fails permanently
    ///
    /// Entries are handled one at a time and acknowledged regardless of the outcome.
    /// The heart is only observed between entries, an entry which is being handled is
    /// always completed first.
    #[instrument(skip_all, fields(topic = self.queue.key(), group = self.group.identifier()))]
    pub async fn run<C, R>(
        &self,
        consumer: &C,
        reporter: &R,
        mut heart: Heart,
    ) -> Result<StopReason, SupervisorError>
    where
        C: Consumer + Send + Sync,
        R: ErrorReporter + Send + Sync,
    {
        let death = heart.death();
        tokio::pin!(death);

        let mut backoff = Backoff::fixed(self.attempts, self.retry_delay);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            enter(SupervisorState::Connecting);
            info!(attempt, limit = backoff.limit(), "Connecting to broker");

            let connect = self.provider.consume(&self.queue, &self.group, &self.consumer);
            let connection = tokio::select! {
                biased;
                reason = &mut death => return Ok(self.stop(StopReason::Terminated(reason))),
                connection = connect => connection,
            };

            let failure = match connection {
                Err(error) => error,
                Ok(mut entries) => {
                    enter(SupervisorState::Polling);

                    loop {
                        tokio::select! {
                            biased;
                            reason = &mut death => return Ok(self.stop(StopReason::Terminated(reason))),
                            entry = entries.next() => match entry {
                                Some(Ok(mut entry)) => {
                                    consumer.consume_entry(&mut entry, reporter).await
                                }
                                Some(Err(error)) => break error,
                                None => return Ok(self.stop(StopReason::StreamEnded)),
                            },
                        }
                    }
                }
            };

            if !failure.is_transient() {
                enter(SupervisorState::Failed);
                error!(error = %failure, "Broker failure is not recoverable");
                return Err(SupervisorError::Fatal(failure));
            }

            match backoff.next() {
                Some(delay) => {
                    enter(SupervisorState::Backoff);
                    warn!(
                        attempt,
                        ?delay,
                        error = %failure,
                        "Group coordinator unavailable, retrying"
                    );

                    tokio::select! {
                        biased;
                        reason = &mut death => return Ok(self.stop(StopReason::Terminated(reason))),
                        _ = sleep(delay) => {},
                    }
                }
                None => {
                    enter(SupervisorState::Failed);
                    error!(attempt, error = %failure, "Unable to reach the group coordinator");
                    return Err(SupervisorError::RetriesExhausted(attempt, failure));
                }
            }
        }
    }

    fn stop(&self, reason: StopReason) -> StopReason {
        enter(SupervisorState::Stopped);
        info!(?reason, "Consumer stopped");
        reason
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::library::communication::event::{EntryMetadata, MessageHeaders, QueueLocation};
    use crate::library::communication::implementation::mock::MockBroker;
    use crate::library::reporting::mock::CollectingErrorReporter;
    use crate::library::EmptyResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const TOPIC: &str = "students";

    #[derive(Default)]
    struct RecordingConsumer {
        payloads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Consumer for RecordingConsumer {
        const NAME: &'static str = "RecordingConsumer";

        async fn consume(&self, payload: &[u8], _metadata: &EntryMetadata) -> EmptyResult {
            let payload = String::from_utf8_lossy(payload).into_owned();
            self.payloads.lock().unwrap().push(payload.clone());

            if payload == "poison" {
                Err("unable to handle entry".into())
            } else {
                Ok(())
            }
        }
    }

    fn supervisor(broker: &MockBroker) -> ConsumerSupervisor<MockBroker> {
        ConsumerSupervisor::new(
            broker.clone(),
            QueueDescriptor::new(TOPIC),
            ConsumerGroupDescriptor::new("replicas", QueueLocation::Head),
            "replica-1",
        )
    }

    fn coordinator_unavailable() -> BrokerError {
        BrokerError::CoordinatorUnavailable("Broker: COORDINATOR_NOT_AVAILABLE".into())
    }

    #[tokio::test(start_paused = true)]
    async fn give_up_after_three_attempts() {
        let broker = MockBroker::default();
        for _ in 0..4 {
            broker.fail_next_connection(coordinator_unavailable());
        }

        let result = supervisor(&broker)
            .run(
                &RecordingConsumer::default(),
                &CollectingErrorReporter::default(),
                Heart::without_heart_stone(),
            )
            .await;

        assert!(matches!(result, Err(SupervisorError::RetriesExhausted(3, _))));

        let attempts = broker.connection_attempts();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[1] - attempts[0], Duration::from_secs(5));
        assert_eq!(attempts[2] - attempts[1], Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn fail_without_retry_on_other_errors() {
        let broker = MockBroker::default();
        broker.fail_next_connection(BrokerError::Connection("authentication failed".into()));

        let result = supervisor(&broker)
            .run(
                &RecordingConsumer::default(),
                &CollectingErrorReporter::default(),
                Heart::without_heart_stone(),
            )
            .await;

        assert!(matches!(result, Err(SupervisorError::Fatal(_))));
        assert_eq!(broker.connection_attempts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recover_from_transient_failures() {
        let broker = MockBroker::default();
        broker.push_raw(TOPIC, "first", MessageHeaders::new());
        broker.push_raw(TOPIC, "second", MessageHeaders::new());
        broker
            .fail_next_connection(coordinator_unavailable())
            .fail_next_stream(coordinator_unavailable());

        let consumer = RecordingConsumer::default();
        let result = supervisor(&broker)
            .run(
                &consumer,
                &CollectingErrorReporter::default(),
                Heart::without_heart_stone(),
            )
            .await;

        assert_eq!(result.unwrap(), StopReason::StreamEnded);
        assert_eq!(broker.connection_attempts().len(), 3);
        assert_eq!(*consumer.payloads.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn continue_after_poisoned_entries() {
        let broker = MockBroker::default();
        broker.push_raw(TOPIC, "poison", MessageHeaders::new());
        broker.push_raw(TOPIC, "healthy", MessageHeaders::new());

        let consumer = RecordingConsumer::default();
        let reporter = CollectingErrorReporter::default();
        let result = supervisor(&broker)
            .run(&consumer, &reporter, Heart::without_heart_stone())
            .await;

        assert_eq!(result.unwrap(), StopReason::StreamEnded);
        assert_eq!(*consumer.payloads.lock().unwrap(), vec!["poison", "healthy"]);
        assert_eq!(
            broker.acknowledged(),
            vec![(TOPIC.to_owned(), 0), (TOPIC.to_owned(), 1)]
        );

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "RecordingConsumer");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_heart_dies() {
        let broker = MockBroker::default();
        broker.fail_next_connection(coordinator_unavailable());

        let (heart, mut stone) = Heart::new();
        let supervisor = supervisor(&broker);
        let consumer = RecordingConsumer::default();
        let reporter = CollectingErrorReporter::default();

        let run = supervisor.run(&consumer, &reporter, heart);
        let kill = async {
            sleep(Duration::from_secs(1)).await;
            stone.kill("shutdown".into()).await;
        };

        let (result, _) = tokio::join!(run, kill);

        assert_eq!(
            result.unwrap(),
            StopReason::Terminated(DeathReason::Killed("shutdown".into()))
        );
        assert_eq!(broker.connection_attempts().len(), 1);
    }
}
