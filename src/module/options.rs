//! Various options usable by modules
//!
//! The structs in this module allow other modules to flatten them into
//! their own options struct. This allows for a unified yet non-cluttered
//! option set.

use crate::library::helpers::parse_seconds;
use std::time::Duration;
use structopt::StructOpt;
use uuid::Uuid;

/// Options for connecting to the Kafka cluster
#[derive(Debug, StructOpt)]
pub struct BrokerOptions {
    /// Comma separated list of bootstrap servers
    #[structopt(
        short = "b",
        long = "brokers",
        env = "KAFKA_BROKERS",
        default_value = "localhost:9092",
        value_name = "host:port"
    )]
    pub brokers: String,
}

/// Options relevant for consumer group membership
#[derive(Debug, StructOpt)]
pub struct ConsumerGroupOptions {
    /// Consumer group shared by all replicas of this service
    #[structopt(
        short = "g",
        long = "group-id",
        env = "KAFKA_CONSUMER_GROUP_ID",
        default_value = "mahasiswa-sync",
        value_name = "group"
    )]
    pub group_id: String,

    /// Identifier of this group member, defaults to a random one
    #[structopt(long, env = "KAFKA_CONSUMER_ID", value_name = "id")]
    pub consumer_id: Option<String>,
}

impl ConsumerGroupOptions {
    /// Configured member identifier or a freshly generated one
    pub fn consumer_id(&self) -> String {
        match &self.consumer_id {
            Some(id) => id.clone(),
            None => format!("{}-{}", self.group_id, Uuid::new_v4().to_simple()),
        }
    }
}

/// Options for the database holding the replicated records
#[derive(Debug, StructOpt)]
pub struct DatabaseOptions {
    /// Database connection URL
    #[structopt(
        short = "d",
        long = "database",
        env = "DATABASE_URL",
        default_value = "sqlite://mahasiswa.db",
        value_name = "url"
    )]
    pub url: String,
}

/// Options for publishing messages
#[derive(Debug, StructOpt)]
pub struct ProducerOptions {
    /// Name of this application, attached to every message
    #[structopt(long, env = "APP_NAME", default_value = "mahasiswa-sync", value_name = "name")]
    pub app_name: String,

    /// Seconds to wait for the broker to confirm a delivery
    #[structopt(
        long,
        env = "KAFKA_DELIVERY_TIMEOUT",
        default_value = "30",
        parse(try_from_str = parse_seconds),
        value_name = "seconds"
    )]
    pub delivery_timeout: Duration,

    /// Return without waiting for the delivery report
    #[structopt(long = "async")]
    pub asynchronous: bool,
}
