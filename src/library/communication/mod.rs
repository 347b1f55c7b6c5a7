//! Structures to exchange messages through a broker
//!
//! Whenever something noteworthy happens, a notification describing what happened is
//! published onto a topic. Interested parties subscribe to that topic as members of a
//! consumer group and process the notifications one after another. The broker assigns
//! each partition of a topic to exactly one member of a group, which provides simple
//! load balancing and ordering per partition key. For more details consult the
//! [`event`] module.
//!
//! The traits in here are implemented by the broker clients in [`implementation`].
//! Services only ever depend on the traits and receive their implementation through
//! a [`CommunicationFactory`] so that they can be tested without a running broker.

mod communication_factory;
mod error;

pub mod event;
pub mod implementation;

pub use communication_factory::CommunicationFactory;
pub use error::{is_coordinator_unavailable, BrokerError, PublishError};
