use crate::constants::ENTITY;
use serde::{Deserialize, Serialize};
use std::fmt;

const CREATED: &str = "created";
const UPDATED: &str = "updated";
const DELETED: &str = "deleted";

/// Tag used when an envelope carries no event at all
pub(super) const UNKNOWN_TAG: &str = "unknown";

/// Kind of change announced by an event
///
/// Tags which do not belong to the student entity are preserved verbatim so that they
/// can be logged when the event is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Record has been inserted
    Created,
    /// Attributes of an existing record have been changed
    Updated,
    /// Record has been soft-deleted
    Deleted,
    /// Any other tag
    Unknown(String),
}

impl EventKind {
    /// Wire representation, e.g. `mahasiswa.created`
    pub fn tag(&self) -> String {
        match self {
            Self::Created => format!("{}.{}", ENTITY, CREATED),
            Self::Updated => format!("{}.{}", ENTITY, UPDATED),
            Self::Deleted => format!("{}.{}", ENTITY, DELETED),
            Self::Unknown(tag) => tag.clone(),
        }
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        let action = tag
            .strip_prefix(ENTITY)
            .and_then(|rest| rest.strip_prefix('.'));

        match action {
            Some(CREATED) => Self::Created,
            Some(UPDATED) => Self::Updated,
            Some(DELETED) => Self::Deleted,
            _ => Self::Unknown(tag.to_owned()),
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.tag()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn parse_known_tags() {
        assert_eq!(EventKind::from("mahasiswa.created"), EventKind::Created);
        assert_eq!(EventKind::from("mahasiswa.updated"), EventKind::Updated);
        assert_eq!(EventKind::from("mahasiswa.deleted"), EventKind::Deleted);
    }

    #[test]
    fn preserve_foreign_tags() {
        assert_eq!(
            EventKind::from("mahasiswa.archived"),
            EventKind::Unknown("mahasiswa.archived".into())
        );
        assert_eq!(
            EventKind::from("dosen.created"),
            EventKind::Unknown("dosen.created".into())
        );
        assert_eq!(EventKind::from("mahasiswacreated").tag(), "mahasiswacreated");
    }

    #[test]
    fn serialize_as_tag() {
        let json = serde_json::to_string(&EventKind::Deleted).unwrap();
        assert_eq!(json, "\"mahasiswa.deleted\"");
    }
}
