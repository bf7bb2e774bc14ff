//! Snapshot data model: per-credential outcomes and aggregate totals.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A successful usage reading for one credential.
///
/// Window bounds are calendar-date strings derived from the upstream
/// epoch-millisecond timestamps; `"not available"` marks a missing timestamp
/// and `"invalid date"` one that does not map to a calendar date.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReading {
    /// Credential id this reading belongs to
    pub id: String,
    /// Display-safe form of the secret, never the raw secret
    pub masked_secret: String,
    /// First day of the usage window
    pub window_start: String,
    /// Last day of the usage window
    pub window_end: String,
    /// Tokens consumed in the window
    pub used: f64,
    /// Token allowance for the window
    pub allowance: f64,
    /// Upstream-reported fraction of the allowance consumed
    pub used_ratio: f64,
}

impl UsageReading {
    /// Remaining allowance before clamping (may be negative when over-used)
    pub fn remaining(&self) -> f64 {
        self.allowance - self.used
    }
}

/// A failed usage query for one credential.
#[derive(Debug, Clone, Serialize)]
pub struct FetchFailure {
    /// Credential id the failure belongs to
    pub id: String,
    /// Display-safe form of the secret, never the raw secret
    pub masked_secret: String,
    /// Short failure category ("transport error", "HTTP 401", ...)
    pub reason: String,
}

/// Per-credential result of one aggregation cycle.
///
/// Exactly one variant per credential; failures are data, not errors, and
/// never abort the cycle. Serialized with an explicit `status` tag so
/// consumers discriminate without probing for field presence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The usage endpoint answered with a well-formed reading
    Usage(UsageReading),
    /// Transport, HTTP, or structural failure
    Failure(FetchFailure),
}

impl FetchOutcome {
    /// Credential id this outcome belongs to
    pub fn id(&self) -> &str {
        match self {
            FetchOutcome::Usage(r) => &r.id,
            FetchOutcome::Failure(f) => &f.id,
        }
    }

    /// The reading, when this outcome is a success
    pub fn as_usage(&self) -> Option<&UsageReading> {
        match self {
            FetchOutcome::Usage(r) => Some(r),
            FetchOutcome::Failure(_) => None,
        }
    }
}

/// Organization-wide totals over the successful readings of one cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateTotals {
    /// Sum of `used` over all readings
    pub total_used: f64,
    /// Sum of `allowance` over all readings
    pub total_allowance: f64,
    /// Sum of per-credential remaining, each clamped at zero.
    ///
    /// Not `total_allowance - total_used`: an over-used credential
    /// contributes 0 and never offsets another credential's surplus.
    pub total_remaining: f64,
}

impl AggregateTotals {
    /// Fold one reading into the totals
    pub fn accumulate(&mut self, reading: &UsageReading) {
        self.total_used += reading.used;
        self.total_allowance += reading.allowance;
        self.total_remaining += reading.remaining().max(0.0);
    }
}

/// One complete, immutable aggregation result.
///
/// `outcomes` is ordered by registry order, not completion order, and its
/// length always equals the number of credentials that entered the cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// When this snapshot was assembled (UTC)
    pub generated_at: DateTime<Utc>,
    /// Number of credentials queried
    pub credential_count: usize,
    /// Organization-wide totals over the successful readings
    pub totals: AggregateTotals,
    /// Per-credential outcomes, in registry order
    pub outcomes: Vec<FetchOutcome>,
}
