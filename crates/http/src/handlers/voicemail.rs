//! Direct voicemail drop endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api_error::ApiError;
use crate::api_types::{VoicemailSendRequest, VoicemailSendResponse};
use crate::AppState;

/// `POST /voicemail/send` with a `{phoneNumber, message?}` JSON body.
pub async fn send_voicemail(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoicemailSendRequest>,
) -> Result<Json<VoicemailSendResponse>, ApiError> {
    let phone = req
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("phoneNumber is required".to_owned()))?;

    let sid = state.lifecycle.send_direct_voicemail(phone, req.message.as_deref()).await?;
    Ok(Json(VoicemailSendResponse { success: true, sid }))
}
