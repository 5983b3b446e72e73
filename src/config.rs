//! Configuration types, built once per run from environment variables.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Calls lasting at least this many seconds are flagged (10 minutes).
pub const LONG_CALL_THRESHOLD_SECS: u64 = 10 * 60;

pub const DEFAULT_LOOKBACK_MINUTES: i64 = 15;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_CALLS: usize = 200;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// Longest accepted lookback window (one week).
pub const MAX_LOOKBACK_MINUTES: i64 = 7 * 24 * 60;

/// Twilio's hard limit on `PageSize`.
const MAX_PAGE_SIZE: u32 = 1000;

/// Required variables, in the order they are reported when missing.
pub const REQUIRED_VARS: [&str; 5] = [
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "SENDGRID_API_KEY",
    "NOTIFICATION_EMAIL",
    "FROM_EMAIL",
];

/// Twilio call-log client settings.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub api_base: String,
    pub page_size: u32,
    /// Stop paging once this many records have been collected.
    pub max_calls: usize,
}

/// SendGrid mail-send client settings.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: SecretString,
    pub api_base: String,
}

/// Everything a single run needs. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub twilio: TwilioConfig,
    pub sendgrid: SendGridConfig,
    /// Recipient of the alert email.
    pub notification_email: String,
    /// Verified sender address.
    pub from_email: String,
    pub lookback: chrono::Duration,
    pub long_call_threshold_secs: u64,
    /// Treat `ringing` and `queued` calls as in progress too.
    pub include_pending: bool,
    /// Log the notification instead of sending it.
    pub dry_run: bool,
    pub http_timeout: Duration,
}

impl MonitorConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as missing. Every missing
    /// required variable is reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<String> = REQUIRED_VARS
            .into_iter()
            .filter(|&key| get(key).is_none())
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }

        let required = |key: &str| get(key).unwrap_or_default();

        let lookback_minutes: i64 = parse_or(
            get("CALL_MONITOR_LOOKBACK_MINUTES"),
            "CALL_MONITOR_LOOKBACK_MINUTES",
            DEFAULT_LOOKBACK_MINUTES,
        )?;
        if !(1..=MAX_LOOKBACK_MINUTES).contains(&lookback_minutes) {
            return Err(invalid(
                "CALL_MONITOR_LOOKBACK_MINUTES",
                &format!("must be between 1 and {MAX_LOOKBACK_MINUTES}"),
            ));
        }
        let lookback = chrono::Duration::try_minutes(lookback_minutes).ok_or_else(|| {
            invalid("CALL_MONITOR_LOOKBACK_MINUTES", "out of range")
        })?;

        let page_size: u32 = parse_or(
            get("CALL_MONITOR_PAGE_SIZE"),
            "CALL_MONITOR_PAGE_SIZE",
            DEFAULT_PAGE_SIZE,
        )?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "CALL_MONITOR_PAGE_SIZE",
                &format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let max_calls: usize = parse_or(
            get("CALL_MONITOR_MAX_CALLS"),
            "CALL_MONITOR_MAX_CALLS",
            DEFAULT_MAX_CALLS,
        )?;
        if max_calls == 0 {
            return Err(invalid("CALL_MONITOR_MAX_CALLS", "must be greater than 0"));
        }

        let timeout_secs: u64 = parse_or(
            get("CALL_MONITOR_HTTP_TIMEOUT_SECS"),
            "CALL_MONITOR_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(invalid("CALL_MONITOR_HTTP_TIMEOUT_SECS", "must be greater than 0"));
        }

        let include_pending = parse_flag(
            get("CALL_MONITOR_INCLUDE_PENDING"),
            "CALL_MONITOR_INCLUDE_PENDING",
        )?;
        let dry_run = parse_flag(get("CALL_MONITOR_DRY_RUN"), "CALL_MONITOR_DRY_RUN")?;

        let twilio_base = get("TWILIO_API_BASE")
            .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string());
        let sendgrid_base = get("SENDGRID_API_BASE")
            .unwrap_or_else(|| DEFAULT_SENDGRID_API_BASE.to_string());

        Ok(Self {
            twilio: TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID"),
                auth_token: SecretString::from(required("TWILIO_AUTH_TOKEN")),
                api_base: twilio_base.trim_end_matches('/').to_string(),
                page_size,
                max_calls,
            },
            sendgrid: SendGridConfig {
                api_key: SecretString::from(required("SENDGRID_API_KEY")),
                api_base: sendgrid_base.trim_end_matches('/').to_string(),
            },
            notification_email: required("NOTIFICATION_EMAIL"),
            from_email: required("FROM_EMAIL"),
            lookback,
            long_call_threshold_secs: LONG_CALL_THRESHOLD_SECS,
            include_pending,
            dry_run,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| invalid(key, &format!("{raw:?}: {e}"))),
    }
}

fn parse_flag(value: Option<String>, key: &str) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, &format!("{raw:?} is not a boolean"))),
    }
}
