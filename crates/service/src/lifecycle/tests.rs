use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use callreach_core::{
    CallStatus, ContactDirectory, ContactInfo, NullContactDirectory, StatusWebhook,
};
use callreach_storage::CallStore;
use callreach_telephony::TelephonyError;

use super::{fallback_sms_body, CallLifecycleService};
use crate::actions::FallbackActions;
use crate::error::ServiceError;

/// Fallback actions with scripted outcomes and invocation logs. An empty
/// script means every invocation succeeds with a generated SID.
#[derive(Default)]
struct ScriptedActions {
    voicemail_outcomes: Mutex<VecDeque<Result<String, String>>>,
    sms_outcomes: Mutex<VecDeque<Result<String, String>>>,
    voicemail_calls: Mutex<Vec<String>>,
    sms_calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedActions {
    fn script_voicemail(&self, outcome: Result<&str, &str>) {
        self.voicemail_outcomes
            .lock()
            .unwrap()
            .push_back(outcome.map(str::to_owned).map_err(str::to_owned));
    }

    fn script_sms(&self, outcome: Result<&str, &str>) {
        self.sms_outcomes
            .lock()
            .unwrap()
            .push_back(outcome.map(str::to_owned).map_err(str::to_owned));
    }

    fn voicemail_count(&self) -> usize {
        self.voicemail_calls.lock().unwrap().len()
    }

    fn sms_count(&self) -> usize {
        self.sms_calls.lock().unwrap().len()
    }

    fn last_sms_body(&self) -> Option<String> {
        self.sms_calls.lock().unwrap().last().map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl FallbackActions for ScriptedActions {
    async fn leave_voicemail(
        &self,
        phone: &str,
        _custom_message: Option<&str>,
    ) -> Result<String, TelephonyError> {
        let mut calls = self.voicemail_calls.lock().unwrap();
        calls.push(phone.to_owned());
        let n = calls.len();
        match self.voicemail_outcomes.lock().unwrap().pop_front() {
            Some(Ok(sid)) => Ok(sid),
            Some(Err(body)) => Err(TelephonyError::HttpStatus { code: 500, body }),
            None => Ok(format!("VM{n}")),
        }
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<String, TelephonyError> {
        let mut calls = self.sms_calls.lock().unwrap();
        calls.push((to.to_owned(), body.to_owned()));
        let n = calls.len();
        match self.sms_outcomes.lock().unwrap().pop_front() {
            Some(Ok(sid)) => Ok(sid),
            Some(Err(body)) => Err(TelephonyError::HttpStatus { code: 500, body }),
            None => Ok(format!("SM{n}")),
        }
    }
}

struct OneContact;

impl ContactDirectory for OneContact {
    fn lookup(&self, phone: &str) -> Option<ContactInfo> {
        (phone == "+15550001111").then(|| ContactInfo {
            fullname: Some("Ada Lovelace".to_owned()),
            ..Default::default()
        })
    }
}

const FROM: &str = "+15550009999";

fn service(actions: Arc<ScriptedActions>) -> (CallLifecycleService, TempDir) {
    service_with_contacts(actions, Arc::new(NullContactDirectory))
}

fn service_with_contacts(
    actions: Arc<ScriptedActions>,
    contacts: Arc<dyn ContactDirectory>,
) -> (CallLifecycleService, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CallStore::new(&dir.path().join("calls.db")).unwrap());
    (CallLifecycleService::new(store, actions, contacts, FROM.to_owned()), dir)
}

fn webhook(call_sid: &str, status: &str, to: Option<&str>) -> StatusWebhook {
    StatusWebhook {
        call_sid: Some(call_sid.to_owned()),
        call_status: Some(status.to_owned()),
        to: to.map(str::to_owned),
        ..Default::default()
    }
}

#[tokio::test]
async fn completed_call_does_not_trigger_voicemail() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));

    svc.handle_status_webhook("CA1", &webhook("CA1", "ringing", Some("+15550001111")))
        .await
        .unwrap();
    let record = svc
        .handle_status_webhook("CA1", &webhook("CA1", "completed", Some("+15550001111")))
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Completed);
    assert_eq!(record.status_history.len(), 2);
    assert_eq!(actions.voicemail_count(), 0);
    assert!(record.voicemail.is_none());
}

#[tokio::test]
async fn no_answer_triggers_exactly_one_voicemail() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));
    let hook = webhook("CA1", "no-answer", Some("+15550001111"));

    let record = svc.handle_status_webhook("CA1", &hook).await.unwrap();
    assert_eq!(record.voicemail.as_ref().unwrap().sid, "VM1");
    assert_eq!(record.voicemail.as_ref().unwrap().status, CallStatus::Initiated);

    // Redelivery of the same terminal-failure webhook is a no-op for the
    // fallback chain.
    let record = svc.handle_status_webhook("CA1", &hook).await.unwrap();
    assert_eq!(actions.voicemail_count(), 1);
    assert_eq!(record.voicemail.as_ref().unwrap().sid, "VM1");

    let initiated: Vec<_> = record
        .status_history
        .iter()
        .filter(|e| e.raw_provider_status == "voicemail-initiated")
        .collect();
    assert_eq!(initiated.len(), 1);
}

#[tokio::test]
async fn failed_delivery_is_recorded_and_retried_on_next_failure() {
    let actions = Arc::new(ScriptedActions::default());
    actions.script_voicemail(Err("provider down"));
    let (svc, _dir) = service(Arc::clone(&actions));
    let hook = webhook("CA1", "busy", Some("+15550001111"));

    let record = svc.handle_status_webhook("CA1", &hook).await.unwrap();
    assert!(record.voicemail.is_none(), "failed delivery must not attach a sub-record");
    let failed = record
        .status_history
        .iter()
        .find(|e| e.raw_provider_status == "voicemail-failed")
        .unwrap();
    assert!(failed.error_message.as_deref().unwrap().contains("provider down"));

    // The next terminal-failure webhook retries the drop.
    let record = svc.handle_status_webhook("CA1", &hook).await.unwrap();
    assert_eq!(actions.voicemail_count(), 2);
    assert_eq!(record.voicemail.as_ref().unwrap().sid, "VM2");
}

#[tokio::test]
async fn missing_phone_skips_voicemail() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));

    let record = svc.handle_status_webhook("CA1", &webhook("CA1", "failed", None)).await.unwrap();

    assert_eq!(actions.voicemail_count(), 0);
    assert!(record.voicemail.is_none());
    let skipped = record
        .status_history
        .iter()
        .find(|e| e.raw_provider_status == "voicemail-failed")
        .unwrap();
    assert!(skipped.description.contains("no phone number"));
}

#[tokio::test]
async fn voicemail_status_correlates_back_to_the_parent_record() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));
    svc.handle_status_webhook("CA1", &webhook("CA1", "no-answer", Some("+15550001111")))
        .await
        .unwrap();

    let mut hook = webhook("VM1", "completed", None);
    hook.recording_url = Some("https://api.example.com/rec/RE1".to_owned());
    hook.recording_sid = Some("RE1".to_owned());
    let record = svc.handle_voicemail_webhook(&hook).await.unwrap().unwrap();

    assert_eq!(record.call_sid, "CA1");
    let vm = record.voicemail.as_ref().unwrap();
    assert_eq!(vm.sid, "VM1");
    assert_eq!(vm.status, CallStatus::Completed);
    assert_eq!(vm.recording_sid.as_deref(), Some("RE1"));
    assert_eq!(actions.sms_count(), 0);
}

#[tokio::test]
async fn unmatched_voicemail_webhook_is_a_noop() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));
    svc.handle_status_webhook("CA1", &webhook("CA1", "no-answer", Some("+15550001111")))
        .await
        .unwrap();

    let result = svc.handle_voicemail_webhook(&webhook("VM999", "failed", None)).await.unwrap();
    assert!(result.is_none());
    assert_eq!(actions.sms_count(), 0);

    let record = svc.get_call("CA1").await.unwrap().unwrap();
    assert_eq!(record.voicemail.as_ref().unwrap().status, CallStatus::Initiated);
}

#[tokio::test]
async fn failed_voicemail_sends_sms_exactly_once() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));
    svc.handle_status_webhook("CA1", &webhook("CA1", "no-answer", Some("+15550001111")))
        .await
        .unwrap();

    let hook = webhook("VM1", "failed", None);
    let record = svc.handle_voicemail_webhook(&hook).await.unwrap().unwrap();
    let sms = record.sms_fallback.as_ref().unwrap();
    assert_eq!(sms.sid, "SM1");
    assert_eq!(sms.status, "sent");

    let body = actions.last_sms_body().unwrap();
    assert!(body.starts_with("Hello,"), "no contact match means generic greeting: {body}");
    assert!(body.contains(FROM));

    // Redelivered voicemail-failure webhook must not send a second SMS.
    let record = svc.handle_voicemail_webhook(&hook).await.unwrap().unwrap();
    assert_eq!(actions.sms_count(), 1);
    assert_eq!(record.sms_fallback.as_ref().unwrap().sid, "SM1");
}

#[tokio::test]
async fn sms_failure_persists_the_voicemail_update() {
    let actions = Arc::new(ScriptedActions::default());
    actions.script_sms(Err("carrier rejected"));
    let (svc, _dir) = service(Arc::clone(&actions));
    svc.handle_status_webhook("CA1", &webhook("CA1", "no-answer", Some("+15550001111")))
        .await
        .unwrap();

    let hook = webhook("VM1", "failed", None);
    let record = svc.handle_voicemail_webhook(&hook).await.unwrap().unwrap();

    assert_eq!(record.voicemail.as_ref().unwrap().status, CallStatus::Failed);
    assert!(record.sms_fallback.is_none());
    let failed = record
        .status_history
        .iter()
        .find(|e| e.raw_provider_status == "sms-fallback-failed")
        .unwrap();
    assert!(failed.error_message.as_deref().unwrap().contains("carrier rejected"));

    // Still eligible for SMS on the next failure webhook.
    let record = svc.handle_voicemail_webhook(&hook).await.unwrap().unwrap();
    assert_eq!(actions.sms_count(), 2);
    assert_eq!(record.sms_fallback.as_ref().unwrap().sid, "SM2");
}

#[tokio::test]
async fn known_contact_personalizes_the_sms() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service_with_contacts(Arc::clone(&actions), Arc::new(OneContact));
    svc.handle_status_webhook("CA1", &webhook("CA1", "busy", Some("+15550001111")))
        .await
        .unwrap();

    svc.handle_voicemail_webhook(&webhook("VM1", "failed", None)).await.unwrap().unwrap();

    let body = actions.last_sms_body().unwrap();
    assert!(body.starts_with("Hello Ada Lovelace,"), "{body}");
}

#[tokio::test]
async fn direct_voicemail_validates_the_phone_number() {
    let actions = Arc::new(ScriptedActions::default());
    let (svc, _dir) = service(Arc::clone(&actions));

    let err = svc.send_direct_voicemail("  ", None).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(actions.voicemail_count(), 0);

    let sid = svc.send_direct_voicemail("+15550001111", Some("Custom text")).await.unwrap();
    assert_eq!(sid, "VM1");
    assert_eq!(actions.voicemail_count(), 1);
}

#[test]
fn sms_body_formats_with_and_without_a_name() {
    assert_eq!(
        fallback_sms_body(Some("Ada Lovelace"), "+15550009999"),
        "Hello Ada Lovelace, we tried to reach you but couldn't connect. Please call us back \
         at +15550009999 at your earliest convenience. Thank you."
    );
    assert!(fallback_sms_body(None, "+15550009999").starts_with("Hello, we tried"));
}
