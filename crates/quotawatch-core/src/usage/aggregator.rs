//! Concurrent fan-out over the credential set and snapshot assembly.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use super::fetcher::UsageFetcher;
use super::types::{AggregateTotals, FetchOutcome, Snapshot, UsageReading};
use crate::credential::Credential;
use crate::error::AggregateError;
use crate::report::{report_positive_balances, BalanceSink};

/// Runs one aggregation cycle: a bounded-concurrency fetch per credential,
/// a full join, and a fold into organization-wide totals.
pub struct Aggregator {
    fetcher: UsageFetcher,
    max_concurrent: usize,
    sink: Arc<dyn BalanceSink>,
}

impl Aggregator {
    /// Create an aggregator.
    ///
    /// `max_concurrent` bounds in-flight fetches per cycle; values below 1
    /// are raised to 1.
    pub fn new(fetcher: UsageFetcher, max_concurrent: usize, sink: Arc<dyn BalanceSink>) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
            sink,
        }
    }

    /// Aggregate usage across `credentials` into one snapshot.
    ///
    /// Every credential is fetched exactly once; all fetches are awaited
    /// before the snapshot is assembled, and `outcomes` keeps the input
    /// order regardless of completion order. Per-credential failures land in
    /// the snapshot as data; the only hard failure is an empty credential
    /// set.
    pub async fn aggregate(&self, credentials: &[Credential]) -> Result<Snapshot, AggregateError> {
        if credentials.is_empty() {
            return Err(AggregateError::NoCredentials);
        }

        debug!(
            "aggregation cycle started for {} credentials (cap {})",
            credentials.len(),
            self.max_concurrent
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let fetches = credentials.iter().map(|credential| {
            let semaphore = semaphore.clone();
            async move {
                // Holding the acquire result keeps the permit for the whole
                // fetch; the semaphore is never closed.
                let _permit = semaphore.acquire().await;
                self.fetcher.fetch(&credential.id, &credential.secret).await
            }
        });

        // join_all preserves input order, so outcomes line up with the
        // credential set without re-sorting by id.
        let outcomes = join_all(fetches).await;

        let mut totals = AggregateTotals::default();
        let successes: Vec<&UsageReading> = outcomes
            .iter()
            .filter_map(FetchOutcome::as_usage)
            .collect();
        for reading in &successes {
            totals.accumulate(reading);
        }

        // Diagnostic side-channel; never affects the snapshot.
        report_positive_balances(self.sink.as_ref(), &successes, credentials);

        Ok(Snapshot {
            generated_at: Utc::now(),
            credential_count: credentials.len(),
            totals,
            outcomes,
        })
    }
}
