//! Provider webhook receivers.
//!
//! Both receivers acknowledge with a plain `"OK"` body. The provider
//! redelivers on non-2xx, and redelivery is exactly what the idempotency
//! guards in the lifecycle service exist for, so fallback trouble never
//! turns into a webhook error.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Form;

use callreach_core::StatusWebhook;

use crate::api_error::ApiError;
use crate::api_types::CallSidQuery;
use crate::AppState;

/// `POST /call-status`. The call SID may arrive as the `callSid` query
/// parameter or the `CallSid` form field.
pub async fn call_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallSidQuery>,
    Form(webhook): Form<StatusWebhook>,
) -> Result<&'static str, ApiError> {
    let call_sid = query
        .call_sid
        .or_else(|| webhook.call_sid.clone())
        .filter(|sid| !sid.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("callSid is required".to_owned()))?;

    state.lifecycle.handle_status_webhook(&call_sid, &webhook).await?;
    Ok("OK")
}

/// `POST /voicemail-status`. Always acknowledges; a webhook that matches
/// no record is a no-op and even a storage failure only gets logged,
/// since a provider retry re-runs against the same idempotent merge.
pub async fn voicemail_status(
    State(state): State<Arc<AppState>>,
    Form(webhook): Form<StatusWebhook>,
) -> &'static str {
    if let Err(e) = state.lifecycle.handle_voicemail_webhook(&webhook).await {
        tracing::error!(error = %e, "voicemail status processing failed");
    }
    "OK"
}
