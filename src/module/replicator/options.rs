use crate::module::options::{BrokerOptions, ConsumerGroupOptions, DatabaseOptions};
use structopt::StructOpt;

/// Options for the replicator module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub broker: BrokerOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub group: ConsumerGroupOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub database: DatabaseOptions,
}
