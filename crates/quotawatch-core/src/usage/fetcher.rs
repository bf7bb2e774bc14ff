//! Single-attempt usage query against the upstream endpoint.
//!
//! Every failure path (transport, HTTP status, malformed payload) is
//! normalized into a [`FetchOutcome::Failure`] carrying a short category
//! reason. The fetcher never returns an error and never retries; diagnostic
//! detail goes to the log, not the outcome.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::types::{FetchFailure, FetchOutcome, UsageReading};
use crate::credential::mask;

/// Fixed client identifier sent with every upstream request
const CLIENT_NAME: &str = concat!("quotawatch/", env!("CARGO_PKG_VERSION"));

/// Reason reported for connection errors and timeouts alike
const REASON_TRANSPORT: &str = "transport error";
/// Reason reported when the response envelope is missing expected fields
const REASON_STRUCTURE: &str = "invalid response structure";

/// Sentinel for a window bound the upstream did not send
const DATE_NOT_AVAILABLE: &str = "not available";
/// Sentinel for a window bound that does not map to a calendar date
const DATE_INVALID: &str = "invalid date";

/// Upstream response envelope: `{ "usage": { startDate, endDate, standard } }`
#[derive(Debug, Deserialize)]
pub(crate) struct UsageEnvelope {
    pub usage: Option<UsageWindow>,
}

/// The usage window and its per-tier breakdown
#[derive(Debug, Deserialize)]
pub(crate) struct UsageWindow {
    #[serde(rename = "startDate")]
    pub start_date: Option<i64>,
    #[serde(rename = "endDate")]
    pub end_date: Option<i64>,
    pub standard: Option<StandardUsage>,
}

/// The standard-tier counters quotawatch aggregates
#[derive(Debug, Deserialize)]
pub(crate) struct StandardUsage {
    #[serde(rename = "orgTotalTokensUsed")]
    pub org_total_tokens_used: Option<f64>,
    #[serde(rename = "totalAllowance")]
    pub total_allowance: Option<f64>,
    #[serde(rename = "usedRatio")]
    pub used_ratio: Option<f64>,
}

/// Queries the upstream usage endpoint, one bearer-authenticated GET per
/// credential.
#[derive(Debug, Clone)]
pub struct UsageFetcher {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl UsageFetcher {
    /// Create a fetcher for `endpoint` with a per-request `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// The endpoint this fetcher queries
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query usage for one credential.
    ///
    /// Exactly one attempt; a timeout is reported the same as any other
    /// transport failure. The secret is masked before the request is issued,
    /// so the masked form is available on every failure path.
    pub async fn fetch(&self, id: &str, secret: &str) -> FetchOutcome {
        let masked_secret = mask(secret);

        let response = match self
            .client
            .get(&self.endpoint)
            .bearer_auth(secret)
            .header("x-client-name", CLIENT_NAME)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("usage fetch for '{}' failed in transport: {}", id, e);
                return failure(id, masked_secret, REASON_TRANSPORT);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("usage endpoint returned {} for '{}': {}", status, id, body);
            return failure(id, masked_secret, format!("HTTP {}", status.as_u16()));
        }

        match response.json::<UsageEnvelope>().await {
            Ok(envelope) => outcome_from_envelope(id, masked_secret, envelope),
            Err(e) => {
                debug!("usage response for '{}' did not parse: {}", id, e);
                failure(id, masked_secret, REASON_STRUCTURE)
            }
        }
    }
}

fn failure(id: &str, masked_secret: String, reason: impl Into<String>) -> FetchOutcome {
    FetchOutcome::Failure(FetchFailure {
        id: id.to_string(),
        masked_secret,
        reason: reason.into(),
    })
}

/// Map a parsed envelope into an outcome.
///
/// A missing `usage` or `usage.standard` object is a structural failure;
/// missing counters inside an otherwise valid envelope default to zero, and
/// missing or unmappable window bounds get their sentinel strings.
pub(crate) fn outcome_from_envelope(
    id: &str,
    masked_secret: String,
    envelope: UsageEnvelope,
) -> FetchOutcome {
    let Some(window) = envelope.usage else {
        return failure(id, masked_secret, REASON_STRUCTURE);
    };
    let Some(standard) = window.standard else {
        return failure(id, masked_secret, REASON_STRUCTURE);
    };

    FetchOutcome::Usage(UsageReading {
        id: id.to_string(),
        masked_secret,
        window_start: format_window_date(window.start_date),
        window_end: format_window_date(window.end_date),
        used: standard.org_total_tokens_used.unwrap_or(0.0),
        allowance: standard.total_allowance.unwrap_or(0.0),
        used_ratio: standard.used_ratio.unwrap_or(0.0),
    })
}

/// Epoch-milliseconds → "YYYY-MM-DD", with sentinels for missing and
/// unmappable values
fn format_window_date(epoch_ms: Option<i64>) -> String {
    match epoch_ms {
        None => DATE_NOT_AVAILABLE.to_string(),
        Some(ms) => match chrono::DateTime::from_timestamp_millis(ms) {
            Some(dt) => dt.date_naive().format("%Y-%m-%d").to_string(),
            None => DATE_INVALID.to_string(),
        },
    }
}
