//! Provider status mapping.
//!
//! Maps raw provider status codes into the canonical lifecycle used by the
//! rest of the system. Total function: every input maps to something, and
//! unrecognized codes pass through unchanged with category `unknown`.

use serde::{Deserialize, Serialize};

/// Canonical lifecycle status of a call.
///
/// Known provider codes map to their own variant; anything the provider
/// invents later is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Pending,
    Initiated,
    Queued,
    Ringing,
    InProgress,
    Completed,
    Busy,
    NoAnswer,
    Failed,
    Canceled,
    Other(String),
}

impl CallStatus {
    /// Parse a raw provider status code. Never fails.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "initiated" => Self::Initiated,
            "queued" => Self::Queued,
            "ringing" => Self::Ringing,
            "in-progress" => Self::InProgress,
            "completed" => Self::Completed,
            "busy" => Self::Busy,
            "no-answer" => Self::NoAnswer,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Initiated => "initiated",
            Self::Queued => "queued",
            Self::Ringing => "ringing",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Busy => "busy",
            Self::NoAnswer => "no-answer",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw,
        }
    }

    /// Lifecycle category this status belongs to.
    pub fn category(&self) -> StatusCategory {
        match self {
            Self::Pending => StatusCategory::Pending,
            Self::Initiated | Self::Queued | Self::Ringing | Self::InProgress => {
                StatusCategory::InProgress
            }
            Self::Completed => StatusCategory::Completed,
            Self::Busy | Self::NoAnswer | Self::Failed | Self::Canceled => StatusCategory::Failed,
            Self::Other(_) => StatusCategory::Unknown,
        }
    }

    /// Whether this status is a terminal failure (busy, no-answer, failed,
    /// canceled) that should trigger the fallback chain.
    pub fn is_terminal_failure(&self) -> bool {
        self.category() == StatusCategory::Failed
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CallStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

/// Provider-agnostic bucket a canonical status falls into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StatusCategory {
    Pending,
    InProgress,
    Completed,
    Failed,
    Unknown,
}

impl StatusCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Result of mapping a raw provider status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStatus {
    pub status: CallStatus,
    pub category: StatusCategory,
    pub description: String,
}

/// Map a raw provider status code to its canonical lifecycle state.
///
/// Pure and total: no side effects, never fails. Unknown codes pass
/// through unchanged rather than being rejected, so a provider rolling
/// out a new status cannot break webhook processing.
pub fn map_status(raw: &str) -> MappedStatus {
    let status = CallStatus::from_raw(raw);
    let category = status.category();
    let description = match &status {
        CallStatus::Pending => "Call is pending".to_owned(),
        CallStatus::Initiated => "Call has been initiated".to_owned(),
        CallStatus::Queued => "Call is queued for dialing".to_owned(),
        CallStatus::Ringing => "Destination is ringing".to_owned(),
        CallStatus::InProgress => "Call is in progress".to_owned(),
        CallStatus::Completed => "Call completed successfully".to_owned(),
        CallStatus::Busy => "Destination was busy".to_owned(),
        CallStatus::NoAnswer => "Destination did not answer".to_owned(),
        CallStatus::Failed => "Call failed to connect".to_owned(),
        CallStatus::Canceled => "Call was canceled before connecting".to_owned(),
        CallStatus::Other(raw) => format!("Unrecognized provider status '{raw}'"),
    };
    MappedStatus { status, category, description }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_map_to_expected_categories() {
        let cases = [
            ("initiated", StatusCategory::InProgress),
            ("queued", StatusCategory::InProgress),
            ("ringing", StatusCategory::InProgress),
            ("in-progress", StatusCategory::InProgress),
            ("completed", StatusCategory::Completed),
            ("busy", StatusCategory::Failed),
            ("no-answer", StatusCategory::Failed),
            ("failed", StatusCategory::Failed),
            ("canceled", StatusCategory::Failed),
        ];
        for (raw, category) in cases {
            let mapped = map_status(raw);
            assert_eq!(mapped.category, category, "category for {raw}");
            assert_eq!(mapped.status.as_str(), raw, "canonical name for {raw}");
        }
    }

    #[test]
    fn unknown_status_passes_through_with_unknown_category() {
        let mapped = map_status("sip-480-temporarily-unavailable");
        assert_eq!(mapped.status, CallStatus::Other("sip-480-temporarily-unavailable".to_owned()));
        assert_eq!(mapped.category, StatusCategory::Unknown);
        assert_eq!(mapped.status.as_str(), "sip-480-temporarily-unavailable");
    }

    #[test]
    fn mapping_is_deterministic() {
        assert_eq!(map_status("busy"), map_status("busy"));
        assert_eq!(map_status("whatever"), map_status("whatever"));
    }

    #[test]
    fn terminal_failure_covers_all_failed_statuses() {
        for raw in ["busy", "no-answer", "failed", "canceled"] {
            assert!(CallStatus::from_raw(raw).is_terminal_failure(), "{raw}");
        }
        assert!(!CallStatus::Completed.is_terminal_failure());
        assert!(!CallStatus::Ringing.is_terminal_failure());
        assert!(!CallStatus::Other("weird".to_owned()).is_terminal_failure());
    }

    #[test]
    fn status_round_trips_through_json() {
        let status = CallStatus::NoAnswer;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"no-answer\"");
        let back: CallStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);

        let other: CallStatus = serde_json::from_str("\"something-new\"").unwrap();
        assert_eq!(other, CallStatus::Other("something-new".to_owned()));
    }
}
