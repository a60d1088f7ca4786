//! Display strings for reports. Totals are only rounded here, never while summing.

use crate::aggregate::AggregateSnapshot;

/// Pie slice label, e.g. "food 13".
pub fn category_label(category: &str, amount: f64) -> String {
    format!("{category} {amount:.0}")
}

/// Annotation above a point on the daily trend line.
pub fn point_label(amount: f64) -> String {
    format!("{amount:.0}")
}

pub fn percentage(share: f64) -> String {
    format!("{share:.1}%")
}

/// Two lines of summary text: month total, then today's total.
pub fn summary_lines(snapshot: &AggregateSnapshot) -> [String; 2] {
    [
        format!("Month total: {:.2}", snapshot.monthly_total),
        format!("Today: {:.2}", snapshot.todays_total),
    ]
}
