//! Typed patch model and pure merge computation.
//!
//! Replaces loose spread-style patching with explicit per-field merge
//! rules, so an update can never silently lose an invariant (for example
//! overwriting `voicemail.sid` while adding a recording URL). The
//! computation is pure: no I/O, no DB access. The storage layer wraps it
//! in a per-key transaction.

use chrono::{DateTime, Utc};

use crate::call_record::{CallRecord, SmsAttempt, StatusEvent, VoicemailAttempt};
use crate::status::{CallStatus, StatusCategory};

/// Patch applied to a [`CallRecord`] in one atomic merge.
///
/// # Merge rules
/// - **Scalars**: overwrite when present, untouched when `None`
/// - **`history`**: appended to `status_history`, never rewriting or
///   reordering existing events
/// - **`voicemail` / `sms_fallback`**: deep-merged field by field; the
///   sub-record is created only when the patch carries a `sid`, and an
///   existing `sid` is never overwritten (first writer wins)
#[derive(Debug, Clone, Default)]
pub struct CallPatch {
    pub client_name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<CallStatus>,
    pub status_category: Option<StatusCategory>,
    pub duration: Option<u32>,
    pub direction: Option<String>,
    pub parent_call_sid: Option<String>,
    pub history: Vec<StatusEvent>,
    pub voicemail: Option<VoicemailPatch>,
    pub sms_fallback: Option<SmsPatch>,
}

/// Partial update to the voicemail sub-record.
#[derive(Debug, Clone, Default)]
pub struct VoicemailPatch {
    pub sid: Option<String>,
    pub status: Option<CallStatus>,
    pub timestamp: Option<DateTime<Utc>>,
    pub recording_url: Option<String>,
    pub recording_sid: Option<String>,
}

/// Partial update to the SMS fallback sub-record.
#[derive(Debug, Clone, Default)]
pub struct SmsPatch {
    pub sid: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Apply a patch to an existing record, or to a lazily synthesized one
/// when the call SID has never been seen before.
///
/// Pure computation; `now` stamps both `updated_at` and any timestamps the
/// patch left unset. The fallback guards (`voicemail.sid`,
/// `sms_fallback.sid` set at most once) are enforced here, which means
/// they hold inside whatever atomicity the caller provides around this
/// function.
pub fn apply_patch(
    existing: Option<CallRecord>,
    call_sid: &str,
    patch: &CallPatch,
    now: DateTime<Utc>,
) -> CallRecord {
    let mut record = existing
        .unwrap_or_else(|| CallRecord::synthesize(call_sid, patch.phone.as_deref(), now));

    if let Some(client_name) = &patch.client_name {
        record.client_name = client_name.clone();
    }
    if let Some(phone) = &patch.phone {
        record.phone = phone.clone();
    }
    if let Some(status) = &patch.status {
        record.status = status.clone();
    }
    if let Some(category) = patch.status_category {
        record.status_category = category;
    }
    if let Some(duration) = patch.duration {
        record.duration = duration;
    }
    if let Some(direction) = &patch.direction {
        record.direction = direction.clone();
    }
    if let Some(parent) = &patch.parent_call_sid {
        record.parent_call_sid = Some(parent.clone());
    }

    record.status_history.extend(patch.history.iter().cloned());

    if let Some(vm_patch) = &patch.voicemail {
        record.voicemail = merge_voicemail(record.voicemail.take(), vm_patch, now);
    }
    if let Some(sms_patch) = &patch.sms_fallback {
        record.sms_fallback = merge_sms(record.sms_fallback.take(), sms_patch, now);
    }

    record.updated_at = now;
    record
}

/// Deep-merge a voicemail patch.
///
/// Creation requires a `sid`; a patch without one against an absent
/// sub-record is dropped (there is nothing to correlate it with later).
/// Once created, the `sid` and creation timestamp are immutable.
fn merge_voicemail(
    existing: Option<VoicemailAttempt>,
    patch: &VoicemailPatch,
    now: DateTime<Utc>,
) -> Option<VoicemailAttempt> {
    match existing {
        Some(mut vm) => {
            if let Some(sid) = &patch.sid {
                if *sid != vm.sid {
                    tracing::warn!(
                        existing = %vm.sid,
                        incoming = %sid,
                        "discarding duplicate voicemail attach, sub-record already present"
                    );
                }
            }
            if let Some(status) = &patch.status {
                vm.status = status.clone();
            }
            if let Some(url) = &patch.recording_url {
                vm.recording_url = Some(url.clone());
            }
            if let Some(sid) = &patch.recording_sid {
                vm.recording_sid = Some(sid.clone());
            }
            Some(vm)
        }
        None => patch.sid.as_ref().map(|sid| VoicemailAttempt {
            sid: sid.clone(),
            status: patch.status.clone().unwrap_or(CallStatus::Initiated),
            timestamp: patch.timestamp.unwrap_or(now),
            recording_url: patch.recording_url.clone(),
            recording_sid: patch.recording_sid.clone(),
        }),
    }
}

/// Deep-merge an SMS patch. Same sid-at-most-once rule as voicemail.
fn merge_sms(existing: Option<SmsAttempt>, patch: &SmsPatch, now: DateTime<Utc>) -> Option<SmsAttempt> {
    match existing {
        Some(mut sms) => {
            if patch.sid.as_deref().is_some_and(|sid| sid != sms.sid) {
                tracing::warn!(
                    existing = %sms.sid,
                    "discarding duplicate SMS attach, sub-record already present"
                );
            }
            if let Some(status) = &patch.status {
                sms.status = status.clone();
            }
            Some(sms)
        }
        None => patch.sid.as_ref().map(|sid| SmsAttempt {
            sid: sid.clone(),
            status: patch.status.clone().unwrap_or_else(|| "sent".to_owned()),
            timestamp: patch.timestamp.unwrap_or(now),
        }),
    }
}
