//! Call records as reported by the Twilio call-log API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Lifecycle state of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Ringing,
    InProgress,
    Canceled,
    Completed,
    Failed,
    Busy,
    NoAnswer,
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Queued => "queued",
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in-progress",
            CallStatus::Canceled => "canceled",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
            CallStatus::Busy => "busy",
            CallStatus::NoAnswer => "no-answer",
            CallStatus::Unknown => "unknown",
        }
    }

    /// The call has not terminated yet.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CallStatus::Queued | CallStatus::Ringing | CallStatus::InProgress
        )
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single call from the provider's call log. Read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct CallRecord {
    pub sid: String,
    pub status: CallStatus,
    /// Seconds. Twilio reports it as a string, null while the call is live.
    #[serde(default, deserialize_with = "de_duration")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "de_rfc2822")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_rfc2822")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub from_formatted: Option<String>,
    #[serde(default)]
    pub to_formatted: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

impl CallRecord {
    /// Caller number, provider-formatted when available.
    pub fn display_from(&self) -> &str {
        display_number(self.from_formatted.as_deref(), &self.from)
    }

    /// Callee number, provider-formatted when available.
    pub fn display_to(&self) -> &str {
        display_number(self.to_formatted.as_deref(), &self.to)
    }

    /// Whether the call belongs to a run whose window starts at `since`.
    ///
    /// Active calls always do; terminated calls do when they started or
    /// ended at or after `since`.
    pub fn is_within_window(&self, since: DateTime<Utc>) -> bool {
        if self.status.is_active() {
            return true;
        }
        self.start_time.is_some_and(|t| t >= since) || self.end_time.is_some_and(|t| t >= since)
    }
}

fn display_number<'a>(formatted: Option<&'a str>, raw: &'a str) -> &'a str {
    match formatted {
        Some(f) if !f.trim().is_empty() => f,
        _ if raw.is_empty() => "Unknown",
        _ => raw,
    }
}

/// Accepts `"42"`, `42`, `null`, or an empty string.
fn de_duration<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid duration {s:?}: {e}"))),
    }
}

/// Twilio timestamps look like `Tue, 31 Aug 2010 20:36:28 +0000`.
fn de_rfc2822<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc2822(s.trim())
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {s:?}: {e}"))),
    }
}
