//! Storage layer for callreach
//!
//! SQLite-backed call record store. Records are self-describing JSON
//! documents keyed by call SID, with an indexed `voicemail_sid` column
//! serving as the correlation index for voicemail-status webhooks.

mod error;
mod migrations;
mod store;
#[cfg(test)]
mod tests;

pub use error::StorageError;
pub use store::CallStore;
