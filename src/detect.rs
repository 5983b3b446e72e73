//! Call detection rules.
//!
//! Two independent rules run over every record:
//! - in-progress: the call is still live (optionally ringing/queued too)
//! - long-call: the reported duration meets the threshold
//!
//! A record matching both is reported once, as in-progress.

use tracing::debug;

use crate::calls::{CallRecord, CallStatus};
use crate::config::{LONG_CALL_THRESHOLD_SECS, MonitorConfig};

/// Why a call was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    LongCall,
    InProgress,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::LongCall => "long_call",
            Reason::InProgress => "in_progress",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged call.
#[derive(Debug, Clone)]
pub struct Detection {
    pub call: CallRecord,
    pub reason: Reason,
}

/// Parameters for the detection rules.
#[derive(Debug, Clone, Copy)]
pub struct DetectionRules {
    pub long_call_threshold_secs: u64,
    /// Also treat `ringing` and `queued` as in progress.
    pub include_pending: bool,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            long_call_threshold_secs: LONG_CALL_THRESHOLD_SECS,
            include_pending: false,
        }
    }
}

impl DetectionRules {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            long_call_threshold_secs: config.long_call_threshold_secs,
            include_pending: config.include_pending,
        }
    }

    fn is_in_progress(&self, call: &CallRecord) -> bool {
        match call.status {
            CallStatus::InProgress => true,
            CallStatus::Ringing | CallStatus::Queued => self.include_pending,
            _ => false,
        }
    }

    fn is_long(&self, call: &CallRecord) -> bool {
        call.duration
            .is_some_and(|secs| secs >= self.long_call_threshold_secs)
    }

    /// Classify one record.
    pub fn classify(&self, call: &CallRecord) -> Option<Reason> {
        if self.is_in_progress(call) {
            Some(Reason::InProgress)
        } else if self.is_long(call) {
            Some(Reason::LongCall)
        } else {
            None
        }
    }
}

/// Run the rules over `calls`, keeping input order.
pub fn detect(calls: &[CallRecord], rules: &DetectionRules) -> Vec<Detection> {
    calls
        .iter()
        .filter_map(|call| {
            let reason = rules.classify(call)?;
            debug!(
                sid = %call.sid,
                status = %call.status,
                duration = ?call.duration,
                reason = %reason,
                "Call flagged"
            );
            Some(Detection {
                call: call.clone(),
                reason,
            })
        })
        .collect()
}
