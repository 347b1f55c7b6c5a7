//! Change events exchanged between the owner of the student records and its replicas
//!
//! Every write to a record is announced on a single topic with an envelope of the form
//! `{"event": "mahasiswa.<kind>", "data": {..}, "sent_at": ".."}`. The [`codec`] turns
//! raw bodies into [`DecodedEvent`](codec::DecodedEvent) values or explains why they
//! have to be discarded.

mod change;
mod kind;

pub mod codec;

pub use change::StudentChangeNotification;
pub use codec::{decode, DecodedEvent, Rejection};
pub use kind::EventKind;
