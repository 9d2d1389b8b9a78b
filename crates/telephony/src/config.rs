//! Environment-derived telephony configuration.

use std::time::Duration;

use callreach_core::env_parse_with_default;

use crate::error::TelephonyError;

/// Default pause between the reject call and the message call.
const DEFAULT_SETTLE_DELAY_SECS: u64 = 3;

/// Provider credentials and fallback tuning, read from the environment.
#[derive(Debug, Clone)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Caller id for outbound calls and SMS, E.164.
    pub from_number: String,
    /// Public base URL of this service for status callbacks
    /// (e.g. `https://example.com/api`). Callbacks are skipped when unset.
    pub callback_base: Option<String>,
    /// Settling delay between the two voicemail protocol phases.
    pub settle_delay: Duration,
    /// Directory of per-phone contact JSON files, if configured.
    pub contacts_dir: Option<String>,
}

impl TelephonyConfig {
    /// Read configuration from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`,
    /// `FROM_NUMBER`, `CALLREACH_CALLBACK_BASE`,
    /// `CALLREACH_SETTLE_DELAY_SECS` and `CALLREACH_CONTACTS_DIR`.
    pub fn from_env() -> Result<Self, TelephonyError> {
        let require = |var: &str| {
            std::env::var(var)
                .map_err(|_| TelephonyError::Config(format!("{var} must be set")))
        };
        Ok(Self {
            account_sid: require("TWILIO_ACCOUNT_SID")?,
            auth_token: require("TWILIO_AUTH_TOKEN")?,
            from_number: require("FROM_NUMBER")?,
            callback_base: std::env::var("CALLREACH_CALLBACK_BASE").ok(),
            settle_delay: Duration::from_secs(env_parse_with_default(
                "CALLREACH_SETTLE_DELAY_SECS",
                DEFAULT_SETTLE_DELAY_SECS,
            )),
            contacts_dir: std::env::var("CALLREACH_CONTACTS_DIR").ok(),
        })
    }

    /// Status-callback URL for voicemail calls, when a callback base is
    /// configured.
    pub fn voicemail_status_callback(&self) -> Option<String> {
        self.callback_base
            .as_deref()
            .map(|base| format!("{}/voicemail-status", base.trim_end_matches('/')))
    }
}
