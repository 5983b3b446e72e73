//! Twilio REST client for the `Calls.json` call log.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::calls::{CallRecord, CallSource};
use crate::config::TwilioConfig;
use crate::error::FetchError;

const PROVIDER: &str = "twilio";
const API_VERSION: &str = "2010-04-01";

/// One page of the call list.
#[derive(Debug, Deserialize)]
struct CallPage {
    #[serde(default)]
    calls: Vec<CallRecord>,
    /// Relative to the API base, e.g. `/2010-04-01/Accounts/AC.../Calls.json?Page=1&...`.
    #[serde(default)]
    next_page_uri: Option<String>,
}

/// Call-log client authenticated with the account SID and auth token.
pub struct TwilioClient {
    config: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}/Calls.json",
            self.config.api_base, self.config.account_sid
        )
    }

    async fn get_page(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<CallPage, FetchError> {
        let mut request = self.client.get(url).basic_auth(
            &self.config.account_sid,
            Some(self.config.auth_token.expose_secret()),
        );
        if !query.is_empty() {
            request = request.query(query);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| FetchError::Request {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<CallPage>().await.map_err(|e| FetchError::Decode {
            provider: PROVIDER.into(),
            reason: e.to_string(),
        })
    }
}

/// Date used for Twilio's `StartTime>=` filter.
///
/// Twilio filters start time by calendar day only. One extra day keeps
/// calls that started before midnight and are still running.
pub fn start_date_filter(since: DateTime<Utc>) -> String {
    (since - chrono::Duration::days(1))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

#[async_trait]
impl CallSource for TwilioClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn recent_calls(&self, since: DateTime<Utc>) -> Result<Vec<CallRecord>, FetchError> {
        let max = self.config.max_calls;
        let first_query = [
            ("StartTime>=", start_date_filter(since)),
            ("PageSize", self.config.page_size.to_string()),
        ];

        let mut page = self.get_page(&self.calls_url(), &first_query).await?;
        let mut calls: Vec<CallRecord> = Vec::new();
        let mut pages = 1;
        let mut visited: HashSet<String> = HashSet::new();

        loop {
            let page_was_empty = page.calls.is_empty();
            calls.extend(page.calls);
            if calls.len() >= max {
                calls.truncate(max);
                debug!(max, "Reached call fetch cap, not following further pages");
                break;
            }
            if page_was_empty {
                break;
            }
            // next_page_uri already carries the filter and page token
            match page.next_page_uri.filter(|uri| !uri.is_empty()) {
                Some(uri) if !visited.insert(uri.clone()) => {
                    warn!(uri = %uri, "Twilio repeated a page URI, stopping pagination");
                    break;
                }
                Some(uri) => {
                    let url = format!("{}{}", self.config.api_base, uri);
                    page = self.get_page(&url, &[]).await?;
                    pages += 1;
                }
                None => break,
            }
        }

        debug!(pages, calls = calls.len(), "Fetched Twilio call log");
        Ok(calls)
    }
}
