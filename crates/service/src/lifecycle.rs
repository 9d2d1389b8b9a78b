//! Call lifecycle state machine and fallback orchestrator.
//!
//! Every status webhook funnels through here: map the raw provider code,
//! merge the transition into the store, then decide whether the fallback
//! chain advances. The chain per record runs from active to voicemail
//! triggered to SMS sent, and each step fires at most once. The attach of
//! the `voicemail` / `sms_fallback` sub-record is the guard, enforced
//! inside the store's atomic merge, so duplicate or racing webhook
//! deliveries collapse into no-ops.

use std::sync::Arc;

use chrono::Utc;

use callreach_core::{
    map_status, CallPatch, CallRecord, CallStatus, ContactDirectory, SmsPatch, StatusCategory,
    StatusEvent, StatusWebhook, VoicemailPatch,
};
use callreach_storage::CallStore;

use crate::actions::FallbackActions;
use crate::error::ServiceError;

/// Orchestrates call records and the voicemail/SMS fallback chain.
pub struct CallLifecycleService {
    store: Arc<CallStore>,
    actions: Arc<dyn FallbackActions>,
    contacts: Arc<dyn ContactDirectory>,
    from_number: String,
}

impl CallLifecycleService {
    pub fn new(
        store: Arc<CallStore>,
        actions: Arc<dyn FallbackActions>,
        contacts: Arc<dyn ContactDirectory>,
        from_number: String,
    ) -> Self {
        Self { store, actions, contacts, from_number }
    }

    /// Process a status webhook for a primary call.
    ///
    /// Merges the transition, then runs the voicemail delivery protocol
    /// when the canonical category is `failed` and no voicemail attempt
    /// exists yet. Protocol failures are recorded in the status history
    /// and swallowed; only storage failures propagate, since the webhook
    /// sender must still be acknowledged on fallback trouble.
    pub async fn handle_status_webhook(
        &self,
        call_sid: &str,
        webhook: &StatusWebhook,
    ) -> Result<CallRecord, ServiceError> {
        let raw = webhook.call_status.as_deref().unwrap_or("unknown");
        let mapped = map_status(raw);

        let patch = CallPatch {
            phone: webhook.to.clone(),
            status: Some(mapped.status.clone()),
            status_category: Some(mapped.category),
            duration: Some(webhook.duration_secs()),
            direction: webhook.direction.clone(),
            parent_call_sid: webhook.parent_call_sid.clone(),
            history: vec![StatusEvent {
                timestamp: Utc::now(),
                raw_provider_status: raw.to_owned(),
                status: mapped.status.clone(),
                category: mapped.category,
                description: mapped.description.clone(),
                duration_at_event: webhook.duration_secs(),
                error_code: webhook.error_code.clone(),
                error_message: webhook.error_message.clone(),
                sip_response_code: webhook.sip_response_code.clone(),
            }],
            ..Default::default()
        };
        let record = self.merge(call_sid, patch).await?;
        tracing::info!(
            call_sid,
            raw_status = raw,
            status = %record.status,
            category = record.status_category.as_str(),
            duration = record.duration,
            "call status updated"
        );

        if mapped.category == StatusCategory::Failed && record.voicemail.is_none() {
            return self.trigger_voicemail(record).await;
        }
        Ok(record)
    }

    /// Run the voicemail protocol for a record that just hit a terminal
    /// failure and record the outcome. The sub-record attach inside the
    /// merge is first-writer-wins, so a concurrent delivery that beat us
    /// to it simply wins and ours is discarded.
    async fn trigger_voicemail(&self, record: CallRecord) -> Result<CallRecord, ServiceError> {
        let call_sid = record.call_sid.clone();
        if !has_known_phone(&record) {
            tracing::warn!(%call_sid, "terminal failure but no phone number on record");
            let patch = CallPatch {
                history: vec![fallback_event(
                    "voicemail-failed",
                    StatusCategory::Failed,
                    "Voicemail skipped: no phone number on record",
                    None,
                )],
                ..Default::default()
            };
            return self.merge(&call_sid, patch).await;
        }

        match self.actions.leave_voicemail(&record.phone, None).await {
            Ok(voicemail_sid) => {
                tracing::info!(%call_sid, %voicemail_sid, "voicemail initiated");
                let patch = CallPatch {
                    voicemail: Some(VoicemailPatch {
                        sid: Some(voicemail_sid.clone()),
                        status: Some(CallStatus::Initiated),
                        ..Default::default()
                    }),
                    history: vec![fallback_event(
                        "voicemail-initiated",
                        StatusCategory::InProgress,
                        &format!("Voicemail drop initiated with SID {voicemail_sid}"),
                        None,
                    )],
                    ..Default::default()
                };
                self.merge(&call_sid, patch).await
            }
            Err(e) => {
                // No sub-record is attached on failure, so a later
                // terminal-failure webhook can retry the drop.
                tracing::warn!(%call_sid, error = %e, "voicemail delivery failed");
                let patch = CallPatch {
                    history: vec![fallback_event(
                        "voicemail-failed",
                        StatusCategory::Failed,
                        "Voicemail delivery failed",
                        Some(e.to_string()),
                    )],
                    ..Default::default()
                };
                self.merge(&call_sid, patch).await
            }
        }
    }

    /// Process a status webhook for a voicemail call, correlated back to
    /// its parent record by the voicemail call's own SID.
    ///
    /// Returns `Ok(None)` when nothing correlates; an unmatched webhook
    /// is a no-op, not an error. When the voicemail itself lands in a
    /// failed state and no SMS has been sent yet, the SMS fallback fires.
    pub async fn handle_voicemail_webhook(
        &self,
        webhook: &StatusWebhook,
    ) -> Result<Option<CallRecord>, ServiceError> {
        let Some(voicemail_sid) = webhook.call_sid.clone() else {
            return Ok(None);
        };
        let parent = self.find_by_voicemail_sid(voicemail_sid.clone()).await?;
        let Some(parent) = parent else {
            tracing::debug!(%voicemail_sid, "voicemail status for unknown call, ignoring");
            return Ok(None);
        };

        let status = CallStatus::from_raw(webhook.call_status.as_deref().unwrap_or("unknown"));
        let patch = CallPatch {
            voicemail: Some(VoicemailPatch {
                status: Some(status.clone()),
                recording_url: webhook.recording_url.clone(),
                recording_sid: webhook.recording_sid.clone(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let record = self.merge(&parent.call_sid, patch).await?;
        tracing::info!(
            call_sid = %record.call_sid,
            %voicemail_sid,
            voicemail_status = %status,
            "voicemail status updated"
        );

        if status.is_terminal_failure() && has_known_phone(&record) && record.sms_fallback.is_none()
        {
            return self.send_sms_fallback(record).await.map(Some);
        }
        Ok(Some(record))
    }

    /// Last rung of the chain: the personalized "we tried to reach you"
    /// SMS. Send failure is recorded and swallowed; the voicemail update
    /// that got us here is already persisted.
    async fn send_sms_fallback(&self, record: CallRecord) -> Result<CallRecord, ServiceError> {
        let call_sid = record.call_sid.clone();
        let name = self.contacts.lookup(&record.phone).and_then(|c| c.fullname);
        let body = fallback_sms_body(name.as_deref(), &self.from_number);

        match self.actions.send_sms(&record.phone, &body).await {
            Ok(sms_sid) => {
                tracing::info!(%call_sid, %sms_sid, "SMS fallback sent");
                let patch = CallPatch {
                    sms_fallback: Some(SmsPatch {
                        sid: Some(sms_sid),
                        status: Some("sent".to_owned()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };
                self.merge(&call_sid, patch).await
            }
            Err(e) => {
                tracing::warn!(%call_sid, error = %e, "SMS fallback failed");
                let patch = CallPatch {
                    history: vec![fallback_event(
                        "sms-fallback-failed",
                        StatusCategory::Failed,
                        "SMS fallback failed",
                        Some(e.to_string()),
                    )],
                    ..Default::default()
                };
                self.merge(&call_sid, patch).await
            }
        }
    }

    /// Direct voicemail drop outside the webhook flow (API / CLI entry).
    pub async fn send_direct_voicemail(
        &self,
        phone: &str,
        custom_message: Option<&str>,
    ) -> Result<String, ServiceError> {
        if phone.trim().is_empty() {
            return Err(ServiceError::InvalidInput("phone number is required".to_owned()));
        }
        Ok(self.actions.leave_voicemail(phone, custom_message).await?)
    }

    pub async fn get_call(&self, call_sid: &str) -> Result<Option<CallRecord>, ServiceError> {
        let store = Arc::clone(&self.store);
        let sid = call_sid.to_owned();
        run_blocking(move || store.get(&sid)).await
    }

    pub async fn list_calls(&self) -> Result<Vec<CallRecord>, ServiceError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.list_all()).await
    }

    async fn merge(&self, call_sid: &str, patch: CallPatch) -> Result<CallRecord, ServiceError> {
        let store = Arc::clone(&self.store);
        let sid = call_sid.to_owned();
        run_blocking(move || store.merge(&sid, &patch)).await
    }

    async fn find_by_voicemail_sid(
        &self,
        voicemail_sid: String,
    ) -> Result<Option<CallRecord>, ServiceError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.find_by_voicemail_sid(&voicemail_sid)).await
    }
}

/// Run a blocking store operation off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, callreach_storage::StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::TaskJoin(e.to_string()))?
        .map_err(ServiceError::from)
}

fn has_known_phone(record: &CallRecord) -> bool {
    !record.phone.trim().is_empty() && record.phone != "Unknown"
}

/// History event for an orchestrator-generated transition (as opposed to
/// one observed from the provider).
fn fallback_event(
    tag: &str,
    category: StatusCategory,
    description: &str,
    error_message: Option<String>,
) -> StatusEvent {
    StatusEvent {
        timestamp: Utc::now(),
        raw_provider_status: tag.to_owned(),
        status: CallStatus::Other(tag.to_owned()),
        category,
        description: description.to_owned(),
        duration_at_event: 0,
        error_code: None,
        error_message,
        sip_response_code: None,
    }
}

fn fallback_sms_body(name: Option<&str>, from_number: &str) -> String {
    let greeting = match name {
        Some(name) => format!("Hello {name}"),
        None => "Hello".to_owned(),
    };
    format!(
        "{greeting}, we tried to reach you but couldn't connect. Please call us back at \
         {from_number} at your earliest convenience. Thank you."
    )
}

#[cfg(test)]
mod tests;
