//! Read-only call record queries.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::api_error::ApiError;
use crate::api_types::{CallListResponse, CallResponse};
use crate::AppState;

/// `GET /call-status/{call_sid}`.
pub async fn get_call_status(
    State(state): State<Arc<AppState>>,
    Path(call_sid): Path<String>,
) -> Result<Json<CallResponse>, ApiError> {
    let record = state
        .lifecycle
        .get_call(&call_sid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Call status not found".to_owned()))?;
    Ok(Json(CallResponse { success: true, data: record }))
}

/// `GET /call-statuses`.
pub async fn list_call_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CallListResponse>, ApiError> {
    let records = state.lifecycle.list_calls().await?;
    Ok(Json(CallListResponse { success: true, count: records.len(), data: records }))
}
