//! Runnable modules each bundling the services of one command and providing a unified configuration

pub mod options;

pub mod producer;
pub mod replicator;
