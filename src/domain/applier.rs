use super::event::{DecodedEvent, EventKind};
use super::{
    RecordStore, StoreError, StudentIdentifier, StudentRecord, DELETED_AT_ATTRIBUTE,
    FILLABLE_ATTRIBUTES,
};
use crate::library::helpers::parse_timestamp;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Result of applying a change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// New record has been created
    Created,
    /// Existing record has been overwritten
    Updated,
    /// Record has been soft-deleted
    DeletedNowSoft,
    /// Record had already been soft-deleted before
    DeletedAlreadySoft,
    /// Record to delete does not exist
    DeletedMissing,
    /// Event has no effect on student records
    Ignored(String),
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::DeletedNowSoft => write!(f, "deleted"),
            Self::DeletedAlreadySoft => write!(f, "already deleted"),
            Self::DeletedMissing => write!(f, "missing"),
            Self::Ignored(tag) => write!(f, "ignored {}", tag),
        }
    }
}

/// Failure to apply a change event
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Store rejected or failed an operation
    #[error("failed to access student records")]
    Store(#[from] StoreError),
    /// Explicit `deleted_at` value could not be interpreted
    #[error("unable to parse deleted_at value {0}")]
    InvalidTimestamp(String),
}

fn text_value(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(text) => Some(Some(text.clone())),
        Value::Number(number) => Some(Some(number.to_string())),
        Value::Bool(flag) => Some(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Falsy values (`null`, `false`, zero, `""`, `"0"`, empty collections) clear the deletion
fn deletion_time(value: &Value) -> Result<Option<DateTime<Utc>>, ApplyError> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(number) if number.as_f64() == Some(0.0) => Ok(None),
        Value::String(text) if text.trim().is_empty() || text == "0" => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(None),
        Value::Object(fields) if fields.is_empty() => Ok(None),
        Value::String(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| ApplyError::InvalidTimestamp(text.clone())),
        other => Err(ApplyError::InvalidTimestamp(other.to_string())),
    }
}

/// Applies change events to a [`RecordStore`] in an idempotent manner
///
/// Events are keyed by the record id. Creations and updates are treated alike (upsert)
/// and only overwrite the attributes present in the event, deletions are soft. Applying
/// the same event twice leaves the store in the state of applying it once.
pub struct StudentApplier<S> {
    store: S,
}

impl<S: RecordStore> StudentApplier<S> {
    /// Creates a new applier writing to the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies a single event
    #[instrument(skip(self, event), fields(event = %event.kind, id = %event.id))]
    pub async fn apply(&self, event: &DecodedEvent) -> Result<ApplyOutcome, ApplyError> {
        match &event.kind {
            EventKind::Created | EventKind::Updated => {
                self.upsert(&event.id, &event.attributes).await
            }
            EventKind::Deleted => self.delete(&event.id).await,
            EventKind::Unknown(tag) => Ok(ApplyOutcome::Ignored(tag.clone())),
        }
    }

    async fn upsert(
        &self,
        id: &StudentIdentifier,
        attributes: &Map<String, Value>,
    ) -> Result<ApplyOutcome, ApplyError> {
        let now = Utc::now();
        let existing = self.store.find_including_deleted(id).await?;
        let is_new = existing.is_none();
        let previous = existing.clone();
        let mut record = existing.unwrap_or_else(|| StudentRecord::new(id.clone(), now));

        for attribute in FILLABLE_ATTRIBUTES.iter() {
            if let Some(value) = attributes.get(*attribute) {
                match text_value(value) {
                    Some(text) => {
                        record.attributes.set(attribute, text);
                    }
                    None => warn!(attribute, "Dropping attribute with structured value"),
                }
            }
        }

        // Upserts revive soft-deleted records unless the event states otherwise
        record.deleted_at = match attributes.get(DELETED_AT_ATTRIBUTE) {
            Some(value) => deletion_time(value)?,
            None => None,
        };

        if let Some(previous) = &previous {
            let mut unchanged = record.clone();
            unchanged.updated_at = previous.updated_at;

            if &unchanged == previous {
                debug!("Record already up to date");
                return Ok(ApplyOutcome::Updated);
            }

            if previous.is_deleted() && !record.is_deleted() {
                debug!("Resurrecting soft-deleted record");
            }
        }

        record.updated_at = now;

        if is_new {
            self.store.create(&record).await?;
            Ok(ApplyOutcome::Created)
        } else {
            self.store.update(&record).await?;
            Ok(ApplyOutcome::Updated)
        }
    }

    async fn delete(&self, id: &StudentIdentifier) -> Result<ApplyOutcome, ApplyError> {
        match self.store.find_including_deleted(id).await? {
            None => Ok(ApplyOutcome::DeletedMissing),
            Some(record) if record.is_deleted() => Ok(ApplyOutcome::DeletedAlreadySoft),
            Some(_) => {
                self.store.soft_delete(id, Utc::now()).await?;
                Ok(ApplyOutcome::DeletedNowSoft)
            }
        }
    }
}
