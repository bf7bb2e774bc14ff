//! Balance reporter — diagnostic side-channel of the aggregation cycle.
//!
//! This is the one place downstream of the fetcher where raw secrets are
//! emitted again, so the sink is an explicit, injected trait rather than an
//! ambient logger call: whoever wires an implementation decides which
//! subsystem gets to observe unmasked credentials.

use tracing::info;

use crate::credential::Credential;
use crate::usage::UsageReading;

/// Receiver for balance diagnostics.
///
/// Implementations must treat what they receive as sensitive — the
/// credential passed to [`BalanceSink::positive_balance`] carries the raw
/// secret.
pub trait BalanceSink: Send + Sync {
    /// A credential still has strictly positive remaining balance
    fn positive_balance(&self, credential: &Credential, remaining: f64);

    /// No credential has remaining balance this cycle
    fn none_remaining(&self);
}

/// Sink that writes balance diagnostics to the log under the `balance`
/// target.
///
/// Raw secrets end up in the log stream; operators enabling this target
/// accept that the log is a sensitive channel.
pub struct LogBalanceSink;

impl BalanceSink for LogBalanceSink {
    fn positive_balance(&self, credential: &Credential, remaining: f64) {
        info!(
            target: "balance",
            "credential '{}' has {} tokens remaining (secret: {})",
            credential.id, remaining, credential.secret
        );
    }

    fn none_remaining(&self) {
        info!(target: "balance", "no credentials with remaining balance");
    }
}

/// Sink that swallows everything, for callers without a diagnostic channel
pub struct NullBalanceSink;

impl BalanceSink for NullBalanceSink {
    fn positive_balance(&self, _credential: &Credential, _remaining: f64) {}
    fn none_remaining(&self) {}
}

/// Emit every successful reading whose unclamped remaining balance is
/// strictly positive, resolved back to its original (unmasked) credential.
///
/// A credential sitting exactly at zero is excluded. When nothing
/// qualifies, a single "none remaining" event is emitted instead.
pub fn report_positive_balances(
    sink: &dyn BalanceSink,
    successes: &[&UsageReading],
    credentials: &[Credential],
) {
    let mut emitted = false;
    for reading in successes {
        let remaining = reading.remaining();
        if remaining <= 0.0 {
            continue;
        }
        if let Some(credential) = credentials.iter().find(|c| c.id == reading.id) {
            sink.positive_balance(credential, remaining);
            emitted = true;
        }
    }
    if !emitted {
        sink.none_remaining();
    }
}
