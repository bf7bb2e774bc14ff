//! Core library for quotawatch — credential registry, usage fetching, and
//! allowance aggregation for a metered upstream API.
//!
//! The engine takes the registered credentials, queries the upstream usage
//! endpoint once per credential (concurrently, bounded by a semaphore),
//! normalizes every success or failure into a [`usage::FetchOutcome`], and
//! folds the successes into organization-wide totals inside a single
//! immutable [`usage::Snapshot`].

pub mod config;
pub mod credential;
pub mod error;
pub mod report;
pub mod usage;

pub use credential::{mask, Credential, CredentialStore, FileStore, MemoryStore};
pub use error::{AggregateError, StoreError};
pub use usage::{AggregateTotals, Aggregator, FetchOutcome, Snapshot, UsageFetcher};
