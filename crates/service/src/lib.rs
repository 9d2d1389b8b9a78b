//! Business logic layer for callreach.
//!
//! The [`CallLifecycleService`] owns the fallback state machine: voice
//! call, then voicemail drop, then SMS, with idempotency guards that hold
//! under duplicate and out-of-order webhook delivery.

mod actions;
mod error;
mod lifecycle;

pub use actions::{FallbackActions, ProviderFallback};
pub use error::ServiceError;
pub use lifecycle::CallLifecycleService;
