//! Typed error enum for the service layer.

use callreach_storage::StorageError;
use callreach_telephony::TelephonyError;
use thiserror::Error;

/// Service-layer error unifying storage and telephony failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB unreachable, corrupt record).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Provider action (call placement, SMS) failed.
    #[error("telephony: {0}")]
    Telephony(#[from] TelephonyError),

    /// Caller provided invalid input (missing phone number, empty SID).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Blocking storage task was cancelled or panicked.
    #[error("task join: {0}")]
    TaskJoin(String),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Telephony(e) => e.is_transient(),
            _ => false,
        }
    }
}
