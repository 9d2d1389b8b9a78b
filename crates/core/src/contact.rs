//! Contact directory collaborator interface.
//!
//! The directory that supplies a name/company for message personalization
//! is external; this trait pins down the boundary so the orchestrator and
//! voicemail builder can be tested against stub directories.

use serde::{Deserialize, Serialize};

/// Contact metadata used to personalize voicemail and SMS text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub ai_profile_name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Lookup of contact metadata by phone number.
///
/// A miss is the normal case, not an error; messages fall back to a
/// generic greeting.
pub trait ContactDirectory: Send + Sync {
    fn lookup(&self, phone: &str) -> Option<ContactInfo>;
}

/// Directory that never finds anyone. Used when no contact source is
/// configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullContactDirectory;

impl ContactDirectory for NullContactDirectory {
    fn lookup(&self, _phone: &str) -> Option<ContactInfo> {
        None
    }
}
