//! Fallback action boundary.
//!
//! The orchestrator drives voicemail drops and SMS sends through this
//! trait so the state machine can be tested against scripted actions
//! without a provider account.

use std::sync::Arc;

use async_trait::async_trait;

use callreach_telephony::{ProviderClient, TelephonyError, VoicemailDelivery};

/// Outbound fallback actions the orchestrator can take.
#[async_trait]
pub trait FallbackActions: Send + Sync {
    /// Run the two-phase voicemail drop; returns the message call's SID.
    async fn leave_voicemail(
        &self,
        phone: &str,
        custom_message: Option<&str>,
    ) -> Result<String, TelephonyError>;

    /// Send an SMS; returns the message SID.
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, TelephonyError>;
}

/// Production implementation backed by the telephony provider.
pub struct ProviderFallback {
    voicemail: VoicemailDelivery,
    client: Arc<ProviderClient>,
}

impl ProviderFallback {
    pub fn new(voicemail: VoicemailDelivery, client: Arc<ProviderClient>) -> Self {
        Self { voicemail, client }
    }
}

#[async_trait]
impl FallbackActions for ProviderFallback {
    async fn leave_voicemail(
        &self,
        phone: &str,
        custom_message: Option<&str>,
    ) -> Result<String, TelephonyError> {
        self.voicemail.deliver(phone, custom_message).await
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<String, TelephonyError> {
        self.client.send_sms(to, body).await
    }
}
