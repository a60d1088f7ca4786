//! Aggregator: turns the whole ledger into the numbers a report needs.
//!
//! Parsing here is tolerant. A row whose date or amount cannot be read is left out
//! and recorded in [`Aggregation::skipped`]; the remaining rows still count.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::record::{LedgerRow, SkipReason};
use crate::time::same_month;

/// Derived totals for one reference date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    pub as_of: NaiveDate,
    /// Sum per day across the whole ledger
    pub daily_totals: BTreeMap<NaiveDate, f64>,
    /// Sum per category for rows dated `as_of`
    pub todays_category_totals: BTreeMap<String, f64>,
    /// Sum for rows in the same calendar month as `as_of`
    pub monthly_total: f64,
    /// Sum for rows dated `as_of`
    pub todays_total: f64,
}

impl AggregateSnapshot {
    fn empty(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            daily_totals: BTreeMap::new(),
            todays_category_totals: BTreeMap::new(),
            monthly_total: 0.0,
            todays_total: 0.0,
        }
    }

    /// Today's categories with their share of today's total, largest first.
    pub fn todays_shares(&self) -> Vec<(&str, f64, f64)> {
        let mut shares: Vec<_> = self
            .todays_category_totals
            .iter()
            .map(|(cat, amount)| {
                let share = if self.todays_total > 0.0 {
                    amount / self.todays_total * 100.0
                } else {
                    0.0
                };
                (cat.as_str(), *amount, share)
            })
            .collect();
        shares.sort_by(|a, b| b.1.total_cmp(&a.1));
        shares
    }
}

/// A row left out of aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// 1-based position among the data rows
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub snapshot: AggregateSnapshot,
    pub skipped: Vec<SkippedRow>,
}

impl Aggregation {
    /// The snapshot, if anything was spent on the reference date.
    ///
    /// `None` means there is nothing to chart, which is not an error.
    pub fn chartable(&self) -> Option<&AggregateSnapshot> {
        if self.snapshot.todays_category_totals.is_empty() {
            None
        } else {
            Some(&self.snapshot)
        }
    }

    /// Whether any day at all has a total.
    pub fn has_history(&self) -> bool {
        !self.snapshot.daily_totals.is_empty()
    }
}

/// Single pass over `rows`, relative to `as_of`.
pub fn compute_snapshot(rows: &[LedgerRow], as_of: NaiveDate) -> Aggregation {
    let mut snapshot = AggregateSnapshot::empty(as_of);
    let mut skipped = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let record = match row.parse() {
            Ok(r) => r,
            Err(reason) => {
                warn!(row = i + 1, %reason, "skipping ledger row");
                skipped.push(SkippedRow { row: i + 1, reason });
                continue;
            }
        };

        *snapshot.daily_totals.entry(record.date).or_insert(0.0) += record.amount;

        if record.date == as_of {
            *snapshot
                .todays_category_totals
                .entry(record.category)
                .or_insert(0.0) += record.amount;
            snapshot.todays_total += record.amount;
        }

        if same_month(record.date, as_of) {
            snapshot.monthly_total += record.amount;
        }
    }

    Aggregation { snapshot, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: &str, amount: &str, category: &str) -> LedgerRow {
        LedgerRow::new(date, amount, category, "")
    }

    #[test]
    fn test_two_day_scenario() {
        let rows = vec![
            row("2024-01-01", "10", "food"),
            row("2024-01-02", "20", "transport"),
        ];
        let agg = compute_snapshot(&rows, day(2024, 1, 2));
        let s = &agg.snapshot;

        assert_eq!(s.daily_totals.len(), 2);
        assert_eq!(s.daily_totals[&day(2024, 1, 1)], 10.0);
        assert_eq!(s.daily_totals[&day(2024, 1, 2)], 20.0);
        assert_eq!(s.todays_category_totals.len(), 1);
        assert_eq!(s.todays_category_totals["transport"], 20.0);
        assert_eq!(s.todays_total, 20.0);
        assert_eq!(s.monthly_total, 30.0);
        assert!(agg.skipped.is_empty());
        assert!(agg.chartable().is_some());
    }

    #[test]
    fn test_empty_ledger_has_nothing_to_chart() {
        let agg = compute_snapshot(&[], day(2024, 1, 2));
        assert!(agg.chartable().is_none());
        assert!(!agg.has_history());
        assert_eq!(agg.snapshot.todays_total, 0.0);
    }

    #[test]
    fn test_history_without_today() {
        let rows = vec![row("2024-01-01", "10", "food")];
        let agg = compute_snapshot(&rows, day(2024, 1, 2));
        assert!(agg.chartable().is_none());
        assert!(agg.has_history());
        assert_eq!(agg.snapshot.monthly_total, 10.0);
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let valid = vec![
            row("2024-01-02", "4.25", "food"),
            row("2024-01-02", "1.75", "food"),
            row("2023-12-31", "9", "shopping"),
        ];
        let mut with_bad = valid.clone();
        with_bad.insert(1, row("2024-13-40", "abc", "food"));

        let clean = compute_snapshot(&valid, day(2024, 1, 2));
        let dirty = compute_snapshot(&with_bad, day(2024, 1, 2));

        assert_eq!(clean.snapshot, dirty.snapshot);
        assert_eq!(dirty.skipped.len(), 1);
        assert_eq!(dirty.skipped[0].row, 2);
        assert!(matches!(
            dirty.skipped[0].reason,
            SkipReason::InvalidDate { .. }
        ));
    }

    #[test]
    fn test_pure_and_sum_invariant() {
        let rows = vec![
            row("2024-03-05", "0.1", "food"),
            row("2024-03-05", "0.2", "transport"),
            row("2024-03-05", "0.3", "food"),
            row("2024-03-04", "7", "food"),
            row("2024-02-28", "100", "rent"),
        ];
        let as_of = day(2024, 3, 5);
        let a = compute_snapshot(&rows, as_of);
        let b = compute_snapshot(&rows, as_of);
        assert_eq!(a, b);

        let s = &a.snapshot;
        let by_category: f64 = s.todays_category_totals.values().sum();
        assert!((s.todays_total - by_category).abs() < 1e-9);
        assert!((s.monthly_total - 7.6).abs() < 1e-9);
        assert_eq!(s.daily_totals[&day(2024, 2, 28)], 100.0);
    }

    #[test]
    fn test_shares_sorted_largest_first() {
        let rows = vec![
            row("2024-01-02", "25", "food"),
            row("2024-01-02", "75", "transport"),
        ];
        let agg = compute_snapshot(&rows, day(2024, 1, 2));
        let shares = agg.snapshot.todays_shares();
        assert_eq!(shares[0].0, "transport");
        assert!((shares[0].2 - 75.0).abs() < 1e-9);
        assert!((shares[1].2 - 25.0).abs() < 1e-9);
    }
}
