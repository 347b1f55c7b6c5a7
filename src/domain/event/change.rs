use super::EventKind;
use crate::constants::STUDENT_TOPIC;
use crate::domain::{StudentIdentifier, StudentRecord};
use crate::library::communication::event::{Notification, QueueDescriptor};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Student record has been created, updated, or deleted by its owner
///
/// The `data` carries a snapshot of the record after the change. Consumers must not rely
/// on `sent_at` for ordering, it is informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentChangeNotification {
    /// Kind of change
    pub event: EventKind,
    /// Snapshot of the record attributes
    pub data: Map<String, Value>,
    /// Time of publication in ISO-8601
    pub sent_at: String,
}

impl StudentChangeNotification {
    /// Creates a new notification stamped with the current time
    pub fn new(event: EventKind, data: Map<String, Value>) -> Self {
        Self {
            event,
            data,
            sent_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }

    /// Announces the current state of a record
    pub fn for_record(event: EventKind, record: &StudentRecord) -> Self {
        Self::new(event, record.to_payload())
    }

    /// Announces the deletion of a record of which only the id is known
    pub fn deleted(id: &StudentIdentifier) -> Self {
        let mut data = Map::new();
        data.insert("id".into(), Value::String(id.to_string()));
        Self::new(EventKind::Deleted, data)
    }

    /// Identifier of the affected record, if the snapshot names one
    pub fn id(&self) -> Option<StudentIdentifier> {
        match self.data.get("id") {
            Some(Value::String(id)) => Some(id.as_str().into()),
            Some(Value::Number(id)) => Some(id.to_string().into()),
            _ => None,
        }
    }
}

impl Notification for StudentChangeNotification {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(STUDENT_TOPIC)
    }
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn serialize_envelope() {
        let notification = StudentChangeNotification::deleted(&"7".into());
        let value = serde_json::to_value(&notification).unwrap();

        assert_eq!(value["event"], "mahasiswa.deleted");
        assert_eq!(value["data"]["id"], "7");
        assert!(value["sent_at"].as_str().unwrap().ends_with("+00:00"));
    }

    #[test]
    fn expose_record_id() {
        let record = StudentRecord::new("abc".into(), Utc::now());
        let notification = StudentChangeNotification::for_record(EventKind::Created, &record);

        assert_eq!(notification.id(), Some("abc".into()));
    }
}
