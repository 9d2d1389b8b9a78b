//! Request (Deserialize) and response (Serialize) types.
//!
//! The query/body field names on the webhook side follow the provider's
//! camelCase callback convention; responses use the `{success, data}`
//! envelope the status consumers were built against.

use serde::{Deserialize, Serialize};

use callreach_core::CallRecord;

#[derive(Debug, Deserialize)]
pub struct CallSidQuery {
    #[serde(rename = "callSid")]
    pub call_sid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoicemailSendRequest {
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallResponse {
    pub success: bool,
    pub data: CallRecord,
}

#[derive(Debug, Serialize)]
pub struct CallListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<CallRecord>,
}

#[derive(Debug, Serialize)]
pub struct VoicemailSendResponse {
    pub success: bool,
    pub sid: String,
}
