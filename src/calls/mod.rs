//! Call-log access: the record model and the provider client.

pub mod model;
pub mod twilio;

pub use model::{CallRecord, CallStatus};
pub use twilio::TwilioClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FetchError;

/// Source of recent call records.
#[async_trait]
pub trait CallSource: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Fetch calls that may have been active since `since`.
    ///
    /// Implementations may over-fetch; the caller applies the exact window.
    async fn recent_calls(&self, since: DateTime<Utc>) -> Result<Vec<CallRecord>, FetchError>;
}
