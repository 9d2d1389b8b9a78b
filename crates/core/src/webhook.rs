//! Provider webhook payloads.
//!
//! Field names are fixed by the telephony provider's callback contract
//! and arrive as form-encoded bodies. Everything is optional at the wire
//! level; required-field validation happens at the HTTP boundary.

use serde::Deserialize;

/// Status callback payload for both primary calls and voicemail calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,
    /// Seconds, delivered as a decimal string.
    #[serde(rename = "CallDuration")]
    pub call_duration: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Direction")]
    pub direction: Option<String>,
    #[serde(rename = "ParentCallSid")]
    pub parent_call_sid: Option<String>,
    #[serde(rename = "ErrorCode")]
    pub error_code: Option<String>,
    #[serde(rename = "ErrorMessage")]
    pub error_message: Option<String>,
    #[serde(rename = "SipResponseCode")]
    pub sip_response_code: Option<String>,
    #[serde(rename = "RecordingUrl")]
    pub recording_url: Option<String>,
    #[serde(rename = "RecordingSid")]
    pub recording_sid: Option<String>,
}

impl StatusWebhook {
    /// Reported duration in seconds; unparseable or missing values read
    /// as zero.
    pub fn duration_secs(&self) -> u32 {
        self.call_duration.as_deref().and_then(|d| d.parse().ok()).unwrap_or(0)
    }
}
