//! Usage aggregation engine — fetch, normalize, and aggregate allowance
//! readings across the credential set.
//!
//! One aggregation cycle queries the upstream usage endpoint once per
//! credential (concurrently, semaphore-bounded), normalizes every result
//! into a [`FetchOutcome`], and folds the successes into a [`Snapshot`].

pub mod aggregator;
pub mod fetcher;
pub mod types;

pub use aggregator::Aggregator;
pub use fetcher::UsageFetcher;
pub use types::{AggregateTotals, FetchFailure, FetchOutcome, Snapshot, UsageReading};
