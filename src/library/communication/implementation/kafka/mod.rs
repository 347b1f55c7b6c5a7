//! Trait implementations using [`rdkafka`](::rdkafka)

use std::time::Duration;

/// Time granted to metadata requests issued while subscribing
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Time granted to outstanding deliveries when flushing a producer
const FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

mod error;
mod factory;
mod publisher;
mod queue_entry;
mod queue_provider;

pub use error::broker_error;
pub use factory::*;
pub use publisher::*;
pub use queue_entry::*;
pub use queue_provider::*;
