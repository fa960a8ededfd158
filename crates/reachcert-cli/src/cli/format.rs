//! Output formatting utilities

use colored::*;
use reachcert_check::{CheckOutcome, Verdict};

/// Format a check outcome with its statistics
pub fn format_outcome(outcome: &CheckOutcome) -> String {
    let headline = match &outcome.verdict {
        Verdict::Accepted => format!("{} Certificate accepted", "✓".green().bold()),
        Verdict::Rejected(rejection) if rejection.is_violation() => {
            format!("{} Certificate rejected: {}", "✗".red().bold(), rejection)
        }
        Verdict::Rejected(rejection) => format!("{} {}", "!".yellow().bold(), rejection),
    };

    let stats = &outcome.statistics;
    format!(
        "{headline}\n\n{}\n  States: {}\n  Partitions: {}\n  Threads: {}\n  Recomputed states: {}\n  Obligations: {}\n  Successor computations: {}\n  Time: {:.2?} (partitioning {:.2?}, checking {:.2?}, global {:.2?})\n",
        "Check Statistics".bold(),
        stats.certificate_states.to_string().cyan(),
        stats.partitions.to_string().cyan(),
        stats.threads.to_string().cyan(),
        stats.added_states.to_string().cyan(),
        stats.obligations.to_string().cyan(),
        stats.successor_computations.to_string().cyan(),
        stats.total_time(),
        stats.partitioning_time,
        stats.checking_time,
        stats.global_time,
    )
}

/// Format error message
pub fn format_error(msg: &str) -> String {
    format!("{} {}", "Error:".red().bold(), msg)
}

/// Format success message
pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg)
}
