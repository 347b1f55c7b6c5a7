//! Implementations of traits from this module using third-party crates

pub mod json;
#[cfg(feature = "kafka")]
pub mod kafka;

#[cfg(test)]
pub mod mock;
