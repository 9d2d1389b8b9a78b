//! REST client for the telephony provider.
//!
//! Speaks the Twilio-compatible 2010-04-01 API: form-encoded POSTs with
//! basic auth, JSON resources back. Every outbound request carries a
//! bounded timeout; a timed-out fallback action is reported as a failure
//! result, never left pending.

use serde::Deserialize;

use crate::config::TelephonyConfig;
use crate::error::TelephonyError;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Client for placing calls and sending messages.
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("from_number", &self.from_number)
            .finish()
    }
}

/// Options for one outbound call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub to: String,
    /// Inline TwiML executed when the call connects.
    pub twiml: String,
    pub record: bool,
    /// Ring timeout in seconds.
    pub timeout_secs: Option<u32>,
    /// DTMF digits sent after the call connects.
    pub send_digits: Option<String>,
    pub machine_detection: Option<String>,
    pub status_callback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceResponse {
    sid: Option<String>,
}

impl ProviderClient {
    /// Build a client from provider credentials.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// failure).
    pub fn new(config: &TelephonyConfig) -> Result<Self, TelephonyError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| TelephonyError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }

    /// Point the client at a different API host (tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    /// Place an outbound call and return its SID.
    pub async fn place_call(&self, options: &CallOptions) -> Result<String, TelephonyError> {
        let mut form: Vec<(&str, String)> = vec![
            ("To", options.to.clone()),
            ("From", self.from_number.clone()),
            ("Twiml", options.twiml.clone()),
            ("Method", "POST".to_owned()),
        ];
        if options.record {
            form.push(("Record", "true".to_owned()));
        }
        if let Some(timeout) = options.timeout_secs {
            form.push(("Timeout", timeout.to_string()));
        }
        if let Some(digits) = &options.send_digits {
            form.push(("SendDigits", digits.clone()));
        }
        if let Some(detection) = &options.machine_detection {
            form.push(("MachineDetection", detection.clone()));
        }
        if let Some(callback) = &options.status_callback {
            form.push(("StatusCallback", callback.clone()));
            form.push(("StatusCallbackEvent", "completed".to_owned()));
            form.push(("StatusCallbackMethod", "POST".to_owned()));
        }

        self.post_resource("Calls", &form, "call placement response").await
    }

    /// Send an SMS and return the message SID.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<String, TelephonyError> {
        let form: Vec<(&str, String)> = vec![
            ("To", to.to_owned()),
            ("From", self.from_number.clone()),
            ("Body", body.to_owned()),
        ];
        self.post_resource("Messages", &form, "message send response").await
    }

    async fn post_resource(
        &self,
        resource: &str,
        form: &[(&str, String)],
        context: &str,
    ) -> Result<String, TelephonyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/{resource}.json",
            self.base_url, self.account_sid
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TelephonyError::HttpStatus { code: status.as_u16(), body });
        }

        let resource: ResourceResponse = serde_json::from_str(&body).map_err(|source| {
            TelephonyError::JsonParse { context: context.to_owned(), source }
        })?;
        resource.sid.ok_or_else(|| TelephonyError::MissingField("sid".to_owned()))
    }
}
