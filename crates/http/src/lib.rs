//! HTTP API server for callreach.
//!
//! Two receiver routes take the provider's form-encoded status callbacks,
//! the rest serve JSON queries over the stored records.

pub mod api_error;
mod api_types;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use callreach_service::CallLifecycleService;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub lifecycle: Arc<CallLifecycleService>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/call-status", post(handlers::webhooks::call_status))
        .route("/voicemail-status", post(handlers::webhooks::voicemail_status))
        .route("/call-status/{call_sid}", get(handlers::calls::get_call_status))
        .route("/call-statuses", get(handlers::calls::list_call_statuses))
        .route("/voicemail/send", post(handlers::voicemail::send_voicemail))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
