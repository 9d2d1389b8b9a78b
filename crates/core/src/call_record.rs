//! Call record document model.
//!
//! One `CallRecord` per primary outbound call, keyed by the provider call
//! SID. Records are persisted as self-describing JSON documents; field
//! names follow the provider's camelCase convention so stored documents
//! read the same as the webhook payloads that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{CallStatus, StatusCategory};

/// Durable record of one outbound call and its fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Provider call SID. Immutable key of the record.
    pub call_sid: String,
    /// Surrogate id assigned at record creation.
    pub id: String,
    pub client_name: String,
    pub phone: String,
    pub status: CallStatus,
    pub status_category: StatusCategory,
    /// Call duration in seconds as last reported by the provider.
    pub duration: u32,
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_call_sid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Append-only history of every status transition observed.
    pub status_history: Vec<StatusEvent>,
    /// Voicemail fallback attempt. At most one per record; created on the
    /// first terminal-failure transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicemail: Option<VoicemailAttempt>,
    /// SMS fallback attempt. At most one per record; created only when the
    /// voicemail attempt itself fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_fallback: Option<SmsAttempt>,
}

impl CallRecord {
    /// Synthesize the lazy initial record for a call SID that was first
    /// seen through a webhook rather than an explicit call-initiation
    /// event.
    pub fn synthesize(call_sid: &str, phone: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            call_sid: call_sid.to_owned(),
            id: uuid::Uuid::new_v4().to_string(),
            client_name: "Unknown".to_owned(),
            phone: phone.unwrap_or("Unknown").to_owned(),
            status: CallStatus::Pending,
            status_category: StatusCategory::Pending,
            duration: 0,
            direction: "outbound".to_owned(),
            parent_call_sid: None,
            created_at: now,
            updated_at: now,
            status_history: Vec::new(),
            voicemail: None,
            sms_fallback: None,
        }
    }
}

/// Immutable snapshot of one observed status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub timestamp: DateTime<Utc>,
    /// Status code exactly as the provider delivered it.
    pub raw_provider_status: String,
    pub status: CallStatus,
    pub category: StatusCategory,
    pub description: String,
    pub duration_at_event: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sip_response_code: Option<String>,
}

/// Voicemail-drop call spawned by the fallback orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoicemailAttempt {
    /// The voicemail call's own provider SID. Globally unique; the sole
    /// correlation key for voicemail-status webhooks.
    pub sid: String,
    pub status: CallStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_sid: Option<String>,
}

/// Fallback SMS sent after a failed voicemail attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmsAttempt {
    pub sid: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
