use super::database;
use crate::domain::{RecordStore, StoreError, StudentIdentifier, StudentRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::Error as SQLError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, instrument};

fn store_error(id: Option<&StudentIdentifier>, error: SQLError) -> StoreError {
    let violation = matches!(
        &error,
        SQLError::Database(e) if e.is_unique_violation() || e.is_check_violation()
    );

    match (error, id) {
        (error, Some(id)) if violation => StoreError::Constraint(id.clone(), error.into()),
        (error @ (SQLError::Io(_) | SQLError::PoolTimedOut | SQLError::PoolClosed), _) => {
            StoreError::Unavailable(error.into())
        }
        (error, _) => StoreError::Query(error.into()),
    }
}

/// [`RecordStore`] backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Opens the database at the given URL, creating it and its tables if necessary
    ///
    /// In-memory databases (`sqlite::memory:`) are bound to a single connection which is
    /// kept open for the lifetime of the store.
    #[instrument]
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(e.into()))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") || url.contains("mode=memory") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;

        database::setup_tables(&pool)
            .await
            .map_err(|e| store_error(None, e))?;

        debug!("Database schema ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_including_deleted(
        &self,
        id: &StudentIdentifier,
    ) -> Result<Option<StudentRecord>, StoreError> {
        database::find_student(&self.pool, id.as_str())
            .await
            .map_err(|e| store_error(Some(id), e))
    }

    async fn create(&self, record: &StudentRecord) -> Result<(), StoreError> {
        database::insert_student(&self.pool, record)
            .await
            .map_err(|e| store_error(Some(&record.id), e))
    }

    async fn update(&self, record: &StudentRecord) -> Result<(), StoreError> {
        database::update_student(&self.pool, record)
            .await
            .map_err(|e| store_error(Some(&record.id), e))?;

        Ok(())
    }

    async fn soft_delete(
        &self,
        id: &StudentIdentifier,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        database::soft_delete_student(&self.pool, id.as_str(), at)
            .await
            .map_err(|e| store_error(Some(id), e))?;

        Ok(())
    }
}
