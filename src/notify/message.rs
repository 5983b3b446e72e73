//! Plain-text alert composition.

use chrono::{DateTime, Utc};

use crate::config::LONG_CALL_THRESHOLD_SECS;
use crate::detect::{Detection, Reason};
use crate::notify::Notification;

pub const SUBJECT_PREFIX: &str = "Twilio Call Monitor Alert";

/// Human-readable duration: `1h 2m 3s`, `5m 0s`, `42s`.
///
/// Absent or zero durations belong to live calls.
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(total) = seconds.filter(|s| *s > 0) else {
        return "In progress".to_string();
    };
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

fn format_start(start: Option<DateTime<Utc>>) -> String {
    start
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn push_entry(lines: &mut Vec<String>, detection: &Detection) {
    let call = &detection.call;
    lines.push(format!("  • Call SID: {}", call.sid));
    lines.push(format!("    From: {}", call.display_from()));
    lines.push(format!("    To: {}", call.display_to()));
    lines.push(format!("    Status: {}", call.status));
    lines.push(format!("    Duration: {}", format_duration(call.duration)));
    lines.push(format!("    Started: {}", format_start(call.start_time)));
    lines.push(format!("    Reason: {}", detection.reason));
    lines.push(String::new());
}

/// Build the single alert email for a non-empty detection list.
pub fn build_notification(detections: &[Detection], from: &str, to: &str) -> Notification {
    let long: Vec<&Detection> = detections
        .iter()
        .filter(|d| d.reason == Reason::LongCall)
        .collect();
    let live: Vec<&Detection> = detections
        .iter()
        .filter(|d| d.reason == Reason::InProgress)
        .collect();

    let mut lines = vec!["Twilio Call Monitor has detected the following calls:".to_string()];
    lines.push(String::new());

    if !long.is_empty() {
        lines.push(format!(
            "Calls longer than {} minutes:",
            LONG_CALL_THRESHOLD_SECS / 60
        ));
        for detection in long {
            push_entry(&mut lines, detection);
        }
    }

    if !live.is_empty() {
        lines.push("Calls currently in progress:".to_string());
        for detection in live {
            push_entry(&mut lines, detection);
        }
    }

    lines.push("This is an automated notification from Twilio Call Monitor.".to_string());

    let count = detections.len();
    let noun = if count == 1 { "call" } else { "calls" };

    Notification {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("{SUBJECT_PREFIX}: {count} {noun} flagged"),
        body: lines.join("\n"),
    }
}
