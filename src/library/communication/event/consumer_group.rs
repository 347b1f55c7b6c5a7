use super::QueueLocation;
use std::time::Duration;

/// Definition of a consumer group
///
/// In a message queue, a group of consumers collaborates to consume messages.
/// Each message is only delivered to one consumer within the same group, identified
/// by its identifier. When the group is created, it starts processing messages
/// from the provided [`QueueLocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerGroupDescriptor {
    identifier: String,
    start: QueueLocation,
    session: SessionSettings,
}

impl ConsumerGroupDescriptor {
    /// Creates a new instance using the default [`SessionSettings`]
    pub fn new(identifier: impl Into<String>, start: QueueLocation) -> Self {
        Self {
            identifier: identifier.into(),
            start,
            session: SessionSettings::default(),
        }
    }

    /// Unique identifier of the group
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Location from where a consumer group begins to consume messages
    ///
    /// Note that it is not guaranteed that this will be honored (e.g. when the group already has committed offsets)!
    pub fn start(&self) -> QueueLocation {
        self.start
    }

    /// Client properties describing this group, in the naming used by Kafka clients
    pub fn client_options(&self) -> Vec<(&'static str, String)> {
        let offset_reset = match self.start {
            QueueLocation::Head => "earliest",
            QueueLocation::Tail => "latest",
        };

        let mut options = vec![
            ("group.id", self.identifier.clone()),
            ("auto.offset.reset", offset_reset.to_owned()),
        ];

        options.extend(self.session.client_options());
        options
    }
}

/// Timeouts and commit behaviour of a consumer session
///
/// The defaults have to match the ones of every other consumer in the deployment,
/// change them only in unison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Time after which the coordinator considers a silent member dead
    pub session_timeout: Duration,
    /// Interval between heartbeats sent to the coordinator
    pub heartbeat_interval: Duration,
    /// Maximum time between two polls before the member is kicked from the group
    pub max_poll_interval: Duration,
    /// Idle time after which broker connections are closed
    pub connections_max_idle: Duration,
    /// Age after which cluster metadata is refreshed
    pub metadata_max_age: Duration,
    /// Timeout for network requests
    pub socket_timeout: Duration,
    /// Whether acknowledged positions are committed periodically in the background
    pub auto_commit: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_millis(30_000),
            heartbeat_interval: Duration::from_millis(10_000),
            max_poll_interval: Duration::from_millis(300_000),
            connections_max_idle: Duration::from_millis(540_000),
            metadata_max_age: Duration::from_millis(300_000),
            socket_timeout: Duration::from_millis(60_000),
            auto_commit: true,
        }
    }
}

impl SessionSettings {
    fn client_options(&self) -> Vec<(&'static str, String)> {
        let millis = |duration: Duration| duration.as_millis().to_string();

        vec![
            ("session.timeout.ms", millis(self.session_timeout)),
            ("heartbeat.interval.ms", millis(self.heartbeat_interval)),
            ("max.poll.interval.ms", millis(self.max_poll_interval)),
            ("connections.max.idle.ms", millis(self.connections_max_idle)),
            ("metadata.max.age.ms", millis(self.metadata_max_age)),
            ("socket.timeout.ms", millis(self.socket_timeout)),
            ("enable.auto.commit", self.auto_commit.to_string()),
            // Positions are only stored once an entry has been acknowledged
            ("enable.auto.offset.store", "false".to_owned()),
        ]
    }
}
