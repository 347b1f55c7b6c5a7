//! Decoding of raw change event bodies
//!
//! Decoding never fails with an error in the usual sense. A body either yields a
//! [`DecodedEvent`] or a [`Rejection`] which describes why the body has to be discarded.
//! Discards are expected (other producers share the topic) and are logged, not reported.

use super::kind::UNKNOWN_TAG;
use super::EventKind;
use crate::constants::headers::ID as ID_HEADER;
use crate::domain::StudentIdentifier;
use crate::library::communication::event::MessageHeaders;
use crate::library::helpers::parse_timestamp;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Change event ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    /// Kind of change
    pub kind: EventKind,
    /// Record affected by the change
    pub id: StudentIdentifier,
    /// Raw `data` mapping, possibly empty
    pub attributes: Map<String, Value>,
    /// Time of publication as claimed by the producer
    pub sent_at: Option<DateTime<Utc>>,
}

/// Reason for discarding a body
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Body is not a JSON object
    #[error("payload is not a JSON object")]
    NotAMapping,
    /// `data` of the given event is present but not an object
    #[error("data of {0} event is not an object")]
    DataNotAMapping(String),
    /// Neither `data.id` nor the `id` header identify a record
    #[error("{0} event carries no id")]
    MissingId(String),
    /// Id of the given event is neither text nor a number
    #[error("{0} event carries an id which is neither text nor a number")]
    InvalidId(String),
}

impl Rejection {
    /// Short machine readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAMapping => "not_a_mapping",
            Self::DataNotAMapping(_) => "data_not_a_mapping",
            Self::MissingId(_) => "missing_id",
            Self::InvalidId(_) => "invalid_id",
        }
    }

    /// Tag of the discarded event, if the body got far enough to name one
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::NotAMapping => None,
            Self::DataNotAMapping(event) | Self::MissingId(event) | Self::InvalidId(event) => {
                Some(event)
            }
        }
    }
}

fn event_tag(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_TAG.to_owned(),
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => other.to_string(),
    }
}

fn identifier(value: &Value, event: &str) -> Result<StudentIdentifier, Rejection> {
    match value {
        Value::String(id) if id.is_empty() => Err(Rejection::MissingId(event.to_owned())),
        Value::String(id) => Ok(id.as_str().into()),
        Value::Number(id) => Ok(id.to_string().into()),
        _ => Err(Rejection::InvalidId(event.to_owned())),
    }
}

/// Decodes a raw body received with the given transport headers
///
/// The record id is taken from `data.id` and falls back to the `id` header when the
/// former is absent or `null`.
pub fn decode(body: &[u8], headers: &MessageHeaders) -> Result<DecodedEvent, Rejection> {
    let mut envelope = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(envelope)) => envelope,
        _ => return Err(Rejection::NotAMapping),
    };

    let event = event_tag(envelope.get("event"));

    let attributes = match envelope.remove("data") {
        None => Map::new(),
        Some(Value::Object(data)) => data,
        Some(_) => return Err(Rejection::DataNotAMapping(event)),
    };

    let id = match attributes.get("id") {
        Some(value) if !value.is_null() => identifier(value, &event)?,
        _ => match headers.get(ID_HEADER) {
            Some(id) if !id.is_empty() => id.as_str().into(),
            _ => return Err(Rejection::MissingId(event)),
        },
    };

    let sent_at = envelope
        .get("sent_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);

    Ok(DecodedEvent {
        kind: EventKind::from(event),
        id,
        attributes,
        sent_at,
    })
}
