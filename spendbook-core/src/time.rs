//! Date utilities: the ledger date format and calendar comparisons.

use chrono::{Datelike, Local, NaiveDate};

/// Date format used in the ledger file and on the command line.
pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a ledger date like "2024-01-02". Surrounding whitespace is ignored.
pub fn parse_ledger_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), LEDGER_DATE_FORMAT)
}

pub fn format_ledger_date(date: NaiveDate) -> String {
    date.format(LEDGER_DATE_FORMAT).to_string()
}

/// Today on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// True when both dates fall in the same calendar month of the same year.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Axis label for a day, e.g. "01-02".
pub fn month_day(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}
