use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Attributes which may be written by change events
pub const FILLABLE_ATTRIBUTES: [&str; 4] = ["nim", "name", "email", "address"];

/// Attribute which controls the soft-deletion state when present in a change event
pub const DELETED_AT_ATTRIBUTE: &str = "deleted_at";

/// Unique and immutable identifier of a student record
///
/// Identifiers are opaque to this crate. Locally generated ones are UUIDs in their
/// hyphenated text form, foreign ones are taken over verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentIdentifier(String);

impl StudentIdentifier {
    /// Generates a new random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_hyphenated().to_string())
    }

    /// Text representation of the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StudentIdentifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for StudentIdentifier {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for StudentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mass-assignable attributes of a student
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAttributes {
    /// Registration number
    pub nim: Option<String>,
    /// Full name
    pub name: Option<String>,
    /// Contact address for electronic mail
    pub email: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

impl StudentAttributes {
    fn slot(&mut self, attribute: &str) -> Option<&mut Option<String>> {
        match attribute {
            "nim" => Some(&mut self.nim),
            "name" => Some(&mut self.name),
            "email" => Some(&mut self.email),
            "address" => Some(&mut self.address),
            _ => None,
        }
    }

    /// Overwrites an attribute by name, returns `false` if the name is not one of
    /// the [`FILLABLE_ATTRIBUTES`].
    pub fn set(&mut self, attribute: &str, value: Option<String>) -> bool {
        match self.slot(attribute) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// Persisted state of a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Unique identifier, doubles as the idempotency and partitioning key
    pub id: StudentIdentifier,
    /// Descriptive attributes
    #[serde(flatten)]
    pub attributes: StudentAttributes,
    /// Time of the first write
    pub created_at: DateTime<Utc>,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
    /// Time of the soft-deletion, hides the record from regular reads when set
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    /// Creates a record without attributes
    pub fn new(id: StudentIdentifier, now: DateTime<Utc>) -> Self {
        Self {
            id,
            attributes: StudentAttributes::default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether the record has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Representation used as the `data` of change events
    pub fn to_payload(&self) -> Map<String, Value> {
        let text = |value: &Option<String>| value.clone().map_or(Value::Null, Value::String);
        let timestamp = |value: &DateTime<Utc>| {
            Value::String(value.to_rfc3339_opts(SecondsFormat::Micros, true))
        };

        let mut payload = Map::new();
        payload.insert("id".into(), Value::String(self.id.to_string()));
        payload.insert("nim".into(), text(&self.attributes.nim));
        payload.insert("name".into(), text(&self.attributes.name));
        payload.insert("email".into(), text(&self.attributes.email));
        payload.insert("address".into(), text(&self.attributes.address));
        payload.insert("created_at".into(), timestamp(&self.created_at));
        payload.insert("updated_at".into(), timestamp(&self.updated_at));
        payload.insert(
            DELETED_AT_ATTRIBUTE.into(),
            self.deleted_at.as_ref().map_or(Value::Null, timestamp),
        );

        payload
    }
}
