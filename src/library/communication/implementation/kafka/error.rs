use crate::library::communication::{is_coordinator_unavailable, BrokerError};
use rdkafka::error::KafkaError;

/// Translates a client error into a [`BrokerError`]
///
/// The error code is consulted first since the rendered message of some
/// variants only carries the human readable description.
pub fn broker_error(error: KafkaError) -> BrokerError {
    if let Some(code) = error.rdkafka_error_code() {
        let code = format!("{:?}", code);

        if is_coordinator_unavailable(&code) {
            return BrokerError::CoordinatorUnavailable(format!("{} ({})", error, code));
        }
    }

    match error {
        KafkaError::ClientConfig(..) | KafkaError::ClientCreation(_) => {
            BrokerError::Configuration(error.into())
        }
        error => BrokerError::classify(error.into()),
    }
}
