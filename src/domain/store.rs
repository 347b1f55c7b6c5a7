use super::{StudentIdentifier, StudentRecord};
use crate::library::BoxedError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of a [`RecordStore`] operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be reached
    #[error("record store unavailable")]
    Unavailable(#[source] BoxedError),
    /// Write of the given record violated a constraint
    #[error("record {0} violates a store constraint")]
    Constraint(StudentIdentifier, #[source] BoxedError),
    /// Any other failure while executing a query
    #[error("record store query failed")]
    Query(#[source] BoxedError),
}

/// Durable storage of student records with soft-deletion support
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Looks up a record by id regardless of its deletion state
    async fn find_including_deleted(
        &self,
        id: &StudentIdentifier,
    ) -> Result<Option<StudentRecord>, StoreError>;

    /// Looks up a record by id, hiding soft-deleted ones
    async fn find(&self, id: &StudentIdentifier) -> Result<Option<StudentRecord>, StoreError> {
        Ok(self
            .find_including_deleted(id)
            .await?
            .filter(|record| !record.is_deleted()))
    }

    /// Inserts a record which does not yet exist
    async fn create(&self, record: &StudentRecord) -> Result<(), StoreError>;

    /// Overwrites every column of an existing record
    async fn update(&self, record: &StudentRecord) -> Result<(), StoreError>;

    /// Marks an existing record as deleted at the given time
    async fn soft_delete(
        &self,
        id: &StudentIdentifier,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
