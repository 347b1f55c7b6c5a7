use crate::domain::event::EventKind;
use crate::module::options::{BrokerOptions, ProducerOptions};
use structopt::StructOpt;

/// Options for the produce module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub broker: BrokerOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub producer: ProducerOptions,

    /// JSON encoded payload to send as the message body, a demo message is sent if omitted
    pub payload: Option<String>,
}

/// Options for the emit module
#[derive(Debug, StructOpt)]
pub struct EmitOptions {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub broker: BrokerOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub producer: ProducerOptions,

    /// Kind of change to announce (created, updated, or deleted)
    #[structopt(parse(try_from_str = parse_event_kind))]
    pub event: EventKind,

    /// Identifier of the record, generated for creations if omitted
    #[structopt(long)]
    pub id: Option<String>,

    /// Registration number
    #[structopt(long)]
    pub nim: Option<String>,

    /// Full name
    #[structopt(long)]
    pub name: Option<String>,

    /// Contact address for electronic mail
    #[structopt(long)]
    pub email: Option<String>,

    /// Postal address
    #[structopt(long)]
    pub address: Option<String>,
}

/// Accepts both the short (`created`) and the full (`mahasiswa.created`) form
fn parse_event_kind(src: &str) -> Result<EventKind, String> {
    let kind = match EventKind::from(src) {
        EventKind::Unknown(_) => EventKind::from(format!("{}.{}", crate::constants::ENTITY, src)),
        kind => kind,
    };

    match kind {
        EventKind::Unknown(_) => Err(format!(
            "unsupported event {}, expected created, updated, or deleted",
            src
        )),
        kind => Ok(kind),
    }
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn parse_short_and_full_event_names() {
        assert_eq!(parse_event_kind("created"), Ok(EventKind::Created));
        assert_eq!(parse_event_kind("mahasiswa.deleted"), Ok(EventKind::Deleted));
        assert!(parse_event_kind("archived").is_err());
    }

    #[test]
    fn parse_emit_flags() {
        let options = EmitOptions::from_iter(&["emit", "updated", "--id", "u-1", "--name", "Ani"]);

        assert_eq!(options.event, EventKind::Updated);
        assert_eq!(options.id.as_deref(), Some("u-1"));
        assert_eq!(options.name.as_deref(), Some("Ani"));
        assert_eq!(options.email, None);
    }
}
