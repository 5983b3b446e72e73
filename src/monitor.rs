//! One monitor run: load config → fetch → detect → notify-or-skip.
//!
//! Nothing is kept between runs; the same ongoing call is reported again on
//! every run that sees it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::calls::{CallSource, TwilioClient};
use crate::config::MonitorConfig;
use crate::detect::{Detection, DetectionRules, Reason, detect};
use crate::error::{Error, Result};
use crate::notify::{LogNotifier, Notifier, SendGridNotifier, build_notification};

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Records returned by the provider.
    pub fetched: usize,
    /// Records inside the lookback window.
    pub in_window: usize,
    pub long_calls: usize,
    pub in_progress: usize,
    pub notified: bool,
}

impl RunReport {
    pub fn flagged(&self) -> usize {
        self.long_calls + self.in_progress
    }
}

/// The two external collaborators of a run.
pub struct Backends {
    pub calls: Box<dyn CallSource>,
    pub notifier: Box<dyn Notifier>,
}

/// Build the production backends from configuration.
pub fn connect(config: &MonitorConfig) -> Result<Backends> {
    let client = http_client(config.http_timeout)?;

    let calls: Box<dyn CallSource> =
        Box::new(TwilioClient::new(config.twilio.clone(), client.clone()));
    let notifier: Box<dyn Notifier> = if config.dry_run {
        Box::new(LogNotifier)
    } else {
        Box::new(SendGridNotifier::new(config.sendgrid.clone(), client))
    };

    Ok(Backends { calls, notifier })
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("call-monitor/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Client(e.to_string()))
}

/// Load configuration through `lookup`, build backends and run once.
///
/// `connect` is only called once configuration is valid, so a config error
/// never touches the network.
pub async fn execute<L, C>(lookup: L, connect: C) -> Result<RunReport>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(&MonitorConfig) -> Result<Backends>,
{
    let config = MonitorConfig::from_lookup(lookup)?;
    let backends = connect(&config)?;
    run_once(
        &config,
        backends.calls.as_ref(),
        backends.notifier.as_ref(),
        Utc::now(),
    )
    .await
}

/// Run the pipeline against explicit backends with `now` as the run time.
pub async fn run_once(
    config: &MonitorConfig,
    source: &dyn CallSource,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let since = now - config.lookback;
    info!(
        since = %since.format("%Y-%m-%d %H:%M:%S UTC"),
        source = source.name(),
        "Starting call monitoring"
    );

    let fetched = source.recent_calls(since).await?;
    let in_window: Vec<_> = fetched
        .iter()
        .filter(|call| call.is_within_window(since))
        .cloned()
        .collect();

    let detections = detect(&in_window, &DetectionRules::from_config(config));
    let count = |reason: Reason| detections.iter().filter(|d| d.reason == reason).count();

    let mut report = RunReport {
        fetched: fetched.len(),
        in_window: in_window.len(),
        long_calls: count(Reason::LongCall),
        in_progress: count(Reason::InProgress),
        notified: false,
    };

    info!(
        fetched = report.fetched,
        in_window = report.in_window,
        long_calls = report.long_calls,
        in_progress = report.in_progress,
        "Calls evaluated"
    );

    if detections.is_empty() {
        info!("No calls to report");
        return Ok(report);
    }

    let notification =
        build_notification(&detections, &config.from_email, &config.notification_email);
    if let Err(e) = notifier.send(&notification).await {
        log_unsent(notifier.name(), &detections);
        return Err(e.into());
    }

    report.notified = true;
    info!(flagged = report.flagged(), "Monitoring completed");
    Ok(report)
}

/// Audit trail for detections whose alert never went out.
fn log_unsent(notifier: &str, detections: &[Detection]) {
    for d in detections {
        error!(
            notifier,
            sid = %d.call.sid,
            status = %d.call.status,
            duration = ?d.call.duration,
            from = %d.call.display_from(),
            to = %d.call.display_to(),
            reason = %d.reason,
            "Unreported call"
        );
    }
}
