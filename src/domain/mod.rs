//! Student specific structures, implementations, and logic

mod applier;
mod store;
mod student;

pub mod event;

pub use applier::{ApplyError, ApplyOutcome, StudentApplier};
pub use store::{RecordStore, StoreError};
pub use student::{
    StudentAttributes, StudentIdentifier, StudentRecord, DELETED_AT_ATTRIBUTE,
    FILLABLE_ATTRIBUTES,
};

#[cfg(test)]
pub use store::mock;
