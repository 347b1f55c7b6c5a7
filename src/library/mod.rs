//! Independent and project agnostic libraries
//!
//! Ideally, any of the submodules in this module can be extracted into their own crate
//! at any given time. They have been written with the replication pipeline in mind,
//! however, everything student specific lives in the [`domain`](super::domain) module.

pub mod communication;
pub mod helpers;
pub mod reporting;

/// Generic error type
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result with no value and a [`BoxedError`]
pub type EmptyResult = Result<(), BoxedError>;
