//! Terminal output for the `quotawatch check` subcommand.

use anyhow::{Context, Result};
use quotawatch_core::usage::{FetchOutcome, Snapshot};
use quotawatch_core::{Aggregator, CredentialStore};

/// Whether color output is enabled (TTY + NO_COLOR not set)
fn use_color() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// ANSI color codes container (empty strings when color is disabled)
struct Colors {
    bold: &'static str,
    dim: &'static str,
    reset: &'static str,
    green: &'static str,
    red: &'static str,
}

impl Colors {
    fn new() -> Self {
        if use_color() {
            Self {
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                reset: "\x1b[0m",
                green: "\x1b[32m",
                red: "\x1b[31m",
            }
        } else {
            Self {
                bold: "",
                dim: "",
                reset: "",
                green: "",
                red: "",
            }
        }
    }
}

/// Run one aggregation cycle and print it as a table.
///
/// An empty credential registry is a hard error here (non-zero exit), not an
/// empty table.
pub async fn run(store: &dyn CredentialStore, aggregator: &Aggregator) -> Result<()> {
    let credentials = store.list_all().context("Failed to read credential store")?;
    let snapshot = aggregator
        .aggregate(&credentials)
        .await
        .context("Aggregation failed")?;
    print_snapshot(&Colors::new(), &snapshot);
    Ok(())
}

/// Print a snapshot as an aligned table with a totals footer
fn print_snapshot(c: &Colors, snapshot: &Snapshot) {
    println!(
        "{}=== Usage snapshot ({} UTC, {} credentials) ==={}",
        c.bold,
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S"),
        snapshot.credential_count,
        c.reset
    );
    println!();

    for outcome in &snapshot.outcomes {
        match outcome {
            FetchOutcome::Usage(r) => {
                let remaining = r.remaining().max(0.0);
                let color = if remaining > 0.0 { c.green } else { c.red };
                println!(
                    "  {:<16} {}{:<14}{} {} → {}  used {} / {}  remaining {}{}{}",
                    r.id,
                    c.dim,
                    r.masked_secret,
                    c.reset,
                    r.window_start,
                    r.window_end,
                    fmt_tokens(r.used),
                    fmt_tokens(r.allowance),
                    color,
                    fmt_tokens(remaining),
                    c.reset
                );
            }
            FetchOutcome::Failure(f) => {
                println!(
                    "  {:<16} {}{:<14}{} {}failed: {}{}",
                    f.id, c.dim, f.masked_secret, c.reset, c.red, f.reason, c.reset
                );
            }
        }
    }

    println!();
    println!(
        "  {}Totals:{} used {} / allowance {} / remaining {}{}{}",
        c.bold,
        c.reset,
        fmt_tokens(snapshot.totals.total_used),
        fmt_tokens(snapshot.totals.total_allowance),
        c.green,
        fmt_tokens(snapshot.totals.total_remaining),
        c.reset
    );
}

/// Render a token count without a trailing `.0` for whole numbers
fn fmt_tokens(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_tokens() {
        assert_eq!(fmt_tokens(0.0), "0");
        assert_eq!(fmt_tokens(100.0), "100");
        assert_eq!(fmt_tokens(12.5), "12.50");
    }
}
