//! Alert delivery.

pub mod message;
pub mod sendgrid;

pub use message::{build_notification, format_duration};
pub use sendgrid::SendGridNotifier;

use async_trait::async_trait;

use crate::error::NotifyError;

/// A single outgoing alert email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers notifications. Implementations do not retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes the notification to the log instead of sending it (dry run).
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            from = %notification.from,
            to = %notification.to,
            subject = %notification.subject,
            "Dry run, notification not sent:\n{}",
            notification.body
        );
        Ok(())
    }
}
