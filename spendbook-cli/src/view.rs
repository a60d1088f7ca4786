//! Plain-text tables for the terminal.

use spendbook_core::format::{percentage, summary_lines};
use spendbook_core::{Aggregation, LedgerRow, LEDGER_HEADER};
use std::fmt::Write as _;

use crate::pipeline::{PublishStep, ReportOutcome};

/// All rows as a left-aligned table, header first. Rows are shown as stored,
/// unparseable ones included.
pub fn ledger_table(rows: &[LedgerRow]) -> String {
    let mut widths = LEDGER_HEADER.map(display_width);
    for row in rows {
        for (w, field) in widths.iter_mut().zip(row.as_fields()) {
            *w = (*w).max(display_width(field));
        }
    }

    let mut out = String::new();
    push_line(&mut out, &LEDGER_HEADER, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths);
    for row in rows {
        push_line(&mut out, &row.as_fields(), &widths);
    }
    let _ = writeln!(out, "{} record(s)", rows.len());
    out
}

/// Totals for the reference date, today's categories largest first.
pub fn summary_text(aggregation: &Aggregation) -> String {
    let snapshot = &aggregation.snapshot;
    let mut out = String::new();
    let _ = writeln!(out, "As of {}", snapshot.as_of);
    for line in summary_lines(snapshot) {
        let _ = writeln!(out, "{line}");
    }
    for (category, amount, share) in snapshot.todays_shares() {
        let _ = writeln!(out, "  {category:<12} {amount:>10.2} {:>7}", percentage(share));
    }
    if !aggregation.skipped.is_empty() {
        let _ = writeln!(out, "{} unreadable row(s) left out", aggregation.skipped.len());
    }
    out
}

/// What a report or trend run produced, for the user.
pub fn outcome_text(outcome: &ReportOutcome) -> String {
    let mut out = String::new();
    match outcome {
        ReportOutcome::NoData { .. } => {
            let _ = writeln!(out, "No data to chart yet.");
        }
        ReportOutcome::Rendered { image, publish, .. } => {
            let _ = writeln!(out, "Chart saved: {}", image.display());
            match publish {
                PublishStep::Disabled => {}
                PublishStep::NotConfigured(msg) => {
                    let _ = writeln!(out, "Not uploaded: {msg}");
                }
                PublishStep::Published { url, qr } => {
                    let _ = writeln!(out, "Uploaded: {url}");
                    let _ = writeln!(out, "Share code: {}", qr.display());
                }
            }
        }
    }
    let skipped = match outcome {
        ReportOutcome::NoData { skipped } | ReportOutcome::Rendered { skipped, .. } => skipped,
    };
    for s in skipped {
        let _ = writeln!(out, "  skipped row {}: {}", s.row, s.reason);
    }
    out
}

fn push_line(out: &mut String, fields: &[&str], widths: &[usize]) {
    let mut line = String::new();
    for (field, width) in fields.iter().zip(widths) {
        let pad = width.saturating_sub(display_width(field));
        line.push_str(field);
        line.push_str(&" ".repeat(pad + 2));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}
