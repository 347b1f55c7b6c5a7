use crate::library::BoxedError;
use thiserror::Error;

/// Markers by which brokers and their client libraries signal that the group coordinator is unreachable
const COORDINATOR_SIGNALS: [&str; 5] = [
    "COORDINATOR_NOT_AVAILABLE",
    "NOT_COORDINATOR",
    "GROUP_COORDINATOR_NOT_AVAILABLE",
    "CoordinatorNotAvailable",
    "NotCoordinator",
];

/// Whether an error message describes an unreachable group coordinator
pub fn is_coordinator_unavailable(message: &str) -> bool {
    COORDINATOR_SIGNALS
        .iter()
        .any(|signal| message.contains(signal))
}

/// Failure to establish or maintain a connection to the broker
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Group coordinator can not be reached, usually while the broker rebalances or restarts
    #[error("group coordinator unavailable: {0}")]
    CoordinatorUnavailable(String),
    /// Subscribed topic does not exist or may not be read
    #[error("topic {0} is unavailable: {1}")]
    TopicUnavailable(String, String),
    /// Client could not be built from the provided options
    #[error("invalid broker client configuration")]
    Configuration(#[source] BoxedError),
    /// Any other connection or consumption failure
    #[error("broker connection failed")]
    Connection(#[source] BoxedError),
}

impl BrokerError {
    /// Sorts an opaque client error into one of the variants by inspecting its message
    pub fn classify(error: BoxedError) -> Self {
        let message = error.to_string();

        if is_coordinator_unavailable(&message) {
            Self::CoordinatorUnavailable(message)
        } else {
            Self::Connection(error)
        }
    }

    /// Whether reconnecting after a delay may resolve the failure
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CoordinatorUnavailable(_))
    }
}

/// Failure to hand a message over to the broker
#[derive(Error, Debug)]
pub enum PublishError {
    /// Message body could not be serialized
    #[error("failed to serialize message body")]
    Serialization(#[from] serde_json::Error),
    /// Publisher could not be created
    #[error("broker client unavailable")]
    Unavailable(#[source] BrokerError),
    /// Broker or client refused the message
    #[error("message to topic {0} was not delivered")]
    Rejected(String, #[source] BoxedError),
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn detect_coordinator_signals() {
        assert!(is_coordinator_unavailable(
            "Broker: COORDINATOR_NOT_AVAILABLE while joining group"
        ));
        assert!(is_coordinator_unavailable("NOT_COORDINATOR"));
        assert!(is_coordinator_unavailable("GROUP_COORDINATOR_NOT_AVAILABLE"));
        assert!(is_coordinator_unavailable(
            "Message consumption error: CoordinatorNotAvailable (Broker: Coordinator not available)"
        ));
        assert!(!is_coordinator_unavailable("SASL authentication failed"));
        assert!(!is_coordinator_unavailable("Unknown topic or partition"));
    }

    #[test]
    fn classify_transient_failures() {
        let error = BrokerError::classify("Broker: NOT_COORDINATOR".into());
        assert!(error.is_transient());
    }

    #[test]
    fn classify_other_failures_as_fatal() {
        let error = BrokerError::classify("Local: Authentication failure".into());

        assert!(matches!(error, BrokerError::Connection(_)));
        assert!(!error.is_transient());
        assert!(!BrokerError::TopicUnavailable("t".into(), "missing".into()).is_transient());
    }
}
