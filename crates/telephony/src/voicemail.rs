//! Voicemail delivery protocol.
//!
//! Two distinct outbound calls, in order:
//! 1. a call that is immediately rejected with a busy signal, priming the
//!    carrier's voicemail detection for the number;
//! 2. after a settling delay, the call that actually speaks the message,
//!    with recording enabled.
//!
//! The reject-then-message sequencing is a carrier heuristic and must not
//! be collapsed into a single call. Errors never escape as panics; the
//! caller receives a failure result and decides what to record.

use std::sync::Arc;
use std::time::Duration;

use callreach_core::{ContactDirectory, ContactInfo};

use crate::client::{CallOptions, ProviderClient};
use crate::config::TelephonyConfig;
use crate::error::TelephonyError;
use crate::twiml::{spell_out, SayOptions, Twiml};

const DEFAULT_MESSAGE: &str = "This is an important message. We tried to reach you but were \
                               unable to connect. Please call us back at your earliest \
                               convenience.";
/// Ring timeout for the message call; generous so slow voicemail systems
/// still pick up.
const MESSAGE_CALL_TIMEOUT_SECS: u32 = 45;

/// Executes the two-phase voicemail drop.
pub struct VoicemailDelivery {
    client: Arc<ProviderClient>,
    contacts: Arc<dyn ContactDirectory>,
    settle_delay: Duration,
    status_callback: Option<String>,
}

impl std::fmt::Debug for VoicemailDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoicemailDelivery")
            .field("settle_delay", &self.settle_delay)
            .field("status_callback", &self.status_callback)
            .finish_non_exhaustive()
    }
}

impl VoicemailDelivery {
    pub fn new(
        client: Arc<ProviderClient>,
        contacts: Arc<dyn ContactDirectory>,
        config: &TelephonyConfig,
    ) -> Self {
        Self {
            client,
            contacts,
            settle_delay: config.settle_delay,
            status_callback: config.voicemail_status_callback(),
        }
    }

    /// Leave the standard voicemail for a phone number. Returns the SID of
    /// the message call (phase 2), the one whose status webhooks must be
    /// correlated back to the originating record.
    pub async fn leave_voicemail(&self, phone: &str) -> Result<String, TelephonyError> {
        self.deliver(phone, None).await
    }

    /// Leave a voicemail with a custom message body.
    pub async fn deliver(
        &self,
        phone: &str,
        custom_message: Option<&str>,
    ) -> Result<String, TelephonyError> {
        let contact = self.contacts.lookup(phone);
        tracing::info!(
            phone,
            known_contact = contact.is_some(),
            "starting voicemail delivery"
        );

        // Phase 1: reject with busy to trigger carrier voicemail.
        let reject = Twiml::new().reject_busy().build();
        let trigger_sid = self
            .client
            .place_call(&CallOptions { to: phone.to_owned(), twiml: reject, ..Default::default() })
            .await?;
        tracing::info!(phone, %trigger_sid, "voicemail trigger call placed");

        // Phase 2 must not start before the carrier has routed the
        // rejected leg to voicemail.
        tokio::time::sleep(self.settle_delay).await;

        let message_sid = self
            .client
            .place_call(&CallOptions {
                to: phone.to_owned(),
                twiml: self.message_twiml(contact.as_ref(), custom_message),
                record: true,
                timeout_secs: Some(MESSAGE_CALL_TIMEOUT_SECS),
                send_digits: Some("#1".to_owned()),
                status_callback: self.status_callback.clone(),
                ..Default::default()
            })
            .await?;
        tracing::info!(phone, %message_sid, "voicemail message call placed");
        Ok(message_sid)
    }

    /// Spoken message: long lead-in pause, personalized greeting and body
    /// at a slow rate, the callback number spelled out twice as slow
    /// again, and trailing silence so the recording is not clipped.
    fn message_twiml(&self, contact: Option<&ContactInfo>, custom_message: Option<&str>) -> String {
        let greeting = match contact.and_then(|c| c.fullname.as_deref()) {
            Some(name) => format!("Hello {name}."),
            None => "Hello.".to_owned(),
        };
        let body = custom_message.unwrap_or(DEFAULT_MESSAGE);
        let spoken = format!("{greeting} {body}");

        let main_voice = SayOptions { pitch: Some("-2%".to_owned()), ..Default::default() };
        let slow_voice = SayOptions { rate: "0.7".to_owned(), ..Default::default() };
        let number = spell_out(self.client.from_number());

        Twiml::new()
            .pause(3)
            .say(&main_voice, &spoken)
            .pause(1)
            .say(&slow_voice, &format!("Again, our number is {number}. Thank you."))
            .pause(2)
            .build()
    }
}
