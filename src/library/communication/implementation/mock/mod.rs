//! In-memory broker for tests
//!
//! The [`MockBroker`] keeps topics as plain vectors and commits positions per consumer
//! group. Connection and stream failures can be scripted up front to drive the retry
//! logic of consumers without a real broker.

mod broker;
mod factory;

pub use broker::*;
pub use factory::*;
