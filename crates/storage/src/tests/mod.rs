//! DB integration tests against a temp-file SQLite store.

#![allow(clippy::unwrap_used)]


use tempfile::TempDir;

use callreach_core::{map_status, CallPatch, StatusEvent};
use chrono::Utc;

use crate::CallStore;

pub(crate) fn create_test_store() -> (CallStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = CallStore::new(&dir.path().join("callreach-test.db")).unwrap();
    (store, dir)
}

/// Build the patch a status webhook would produce, the way the service
/// layer does.
pub(crate) fn status_patch(raw: &str, to: Option<&str>, duration: u32) -> CallPatch {
    let mapped = map_status(raw);
    CallPatch {
        phone: to.map(ToOwned::to_owned),
        status: Some(mapped.status.clone()),
        status_category: Some(mapped.category),
        duration: Some(duration),
        history: vec![StatusEvent {
            timestamp: Utc::now(),
            raw_provider_status: raw.to_owned(),
            status: mapped.status,
            category: mapped.category,
            description: mapped.description,
            duration_at_event: duration,
            error_code: None,
            error_message: None,
            sip_response_code: None,
        }],
        ..Default::default()
    }
}
