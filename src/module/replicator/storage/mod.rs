//! Durable storage of replicated student records

mod database;
mod sqlite;

pub use sqlite::SqliteRecordStore;
