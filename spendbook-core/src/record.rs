//! Expense records, both validated and as raw ledger rows.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::time::{format_ledger_date, parse_ledger_date};

/// Column names of the ledger file, in order.
pub const LEDGER_HEADER: [&str; 4] = ["date", "amount", "category", "note"];

/// One logged expense
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExpenseRecord {
    /// Day of the expense (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Amount spent, never negative when entered through the form
    pub amount: f64,
    /// Category label
    pub category: String,
    /// Free-form note, may be empty
    pub note: String,
}

impl ExpenseRecord {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            category: category.into(),
            note: note.into(),
        }
    }

    /// Text form written to the ledger. `f64` display is round-trip exact.
    pub fn to_row(&self) -> LedgerRow {
        LedgerRow {
            date: format_ledger_date(self.date),
            amount: self.amount.to_string(),
            category: self.category.clone(),
            note: self.note.clone(),
        }
    }
}

/// A ledger line exactly as stored: four text columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    pub date: String,
    pub amount: String,
    pub category: String,
    pub note: String,
}

impl LedgerRow {
    pub fn new(
        date: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount: amount.into(),
            category: category.into(),
            note: note.into(),
        }
    }

    pub fn as_fields(&self) -> [&str; 4] {
        [&self.date, &self.amount, &self.category, &self.note]
    }

    /// Interpret the row, or say why it can't be used.
    pub fn parse(&self) -> Result<ExpenseRecord, SkipReason> {
        let date = parse_ledger_date(&self.date).map_err(|_| SkipReason::InvalidDate {
            value: self.date.clone(),
        })?;

        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| SkipReason::InvalidAmount {
                value: self.amount.clone(),
            })?;

        let category = self.category.trim();
        if category.is_empty() {
            return Err(SkipReason::EmptyCategory);
        }

        Ok(ExpenseRecord {
            date,
            amount,
            category: category.to_string(),
            note: self.note.clone(),
        })
    }
}

/// Why a stored row was left out of aggregation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("invalid date '{value}'")]
    InvalidDate { value: String },
    #[error("invalid amount '{value}'")]
    InvalidAmount { value: String },
    #[error("empty category")]
    EmptyCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let record = ExpenseRecord::new(date, 12.5, "food", "lunch");
        let row = record.to_row();
        assert_eq!(row.as_fields(), ["2024-01-01", "12.5", "food", "lunch"]);
        assert_eq!(row.parse().unwrap(), record);
    }

    #[test]
    fn test_parse_keeps_written_precision() {
        let row = LedgerRow::new("2024-01-01", "12.50", "food", "lunch");
        let record = row.parse().unwrap();
        assert_eq!(record.amount, 12.50);
        assert_eq!(record.note, "lunch");
    }

    #[test]
    fn test_parse_reasons() {
        let bad_date = LedgerRow::new("yesterday", "1", "food", "");
        assert_eq!(
            bad_date.parse().unwrap_err(),
            SkipReason::InvalidDate {
                value: "yesterday".to_string()
            }
        );

        let bad_amount = LedgerRow::new("2024-01-01", "ten", "food", "");
        assert!(matches!(
            bad_amount.parse(),
            Err(SkipReason::InvalidAmount { .. })
        ));

        let nan = LedgerRow::new("2024-01-01", "NaN", "food", "");
        assert!(matches!(nan.parse(), Err(SkipReason::InvalidAmount { .. })));

        let no_category = LedgerRow::new("2024-01-01", "3", "  ", "");
        assert_eq!(no_category.parse().unwrap_err(), SkipReason::EmptyCategory);
    }

    #[test]
    fn test_skip_reason_serializes_with_kind() {
        let json = serde_json::to_value(SkipReason::EmptyCategory).unwrap();
        assert_eq!(json["kind"], "empty_category");
    }
}
