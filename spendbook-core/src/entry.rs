//! Entry form validation: raw user input in, a record ready for the ledger out.

use chrono::NaiveDate;
use thiserror::Error;

use crate::category::{CategorySet, OTHER_CATEGORY};
use crate::record::ExpenseRecord;
use crate::time::parse_ledger_date;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("amount must be a number, got '{0}'")]
    NonNumericAmount(String),
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(f64),
    #[error("amount {0} is larger than {max}", max = MAX_AMOUNT)]
    AmountTooLarge(f64),
    #[error("'{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("{date} is in the future (today is {today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
    #[error("please enter a custom category")]
    EmptyCategory,
}

/// Largest single expense accepted. Keeps every total well inside what a chart
/// axis can hold.
pub const MAX_AMOUNT: f64 = 1e12;

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    /// `None` or blank means today.
    pub date: Option<String>,
    pub amount: String,
    /// Selected label; `other` defers to `custom_category`.
    pub category: String,
    pub custom_category: Option<String>,
    pub note: String,
}

impl EntryForm {
    /// Validate against `today` and the current registry.
    ///
    /// On success returns the record plus the registry grown by its category. On
    /// failure nothing changes: the caller keeps its registry as it was.
    pub fn validate(
        &self,
        categories: &CategorySet,
        today: NaiveDate,
    ) -> Result<(ExpenseRecord, CategorySet), ValidationError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(s) => parse_ledger_date(s).map_err(|_| ValidationError::InvalidDate(s.to_string()))?,
        };
        if date > today {
            return Err(ValidationError::FutureDate { date, today });
        }

        let category = self.resolve_category()?;

        let amount_text = self.amount.trim();
        let amount = amount_text
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| ValidationError::NonNumericAmount(amount_text.to_string()))?;
        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(amount));
        }

        let grown = categories.clone().with(&category);
        let record = ExpenseRecord::new(date, amount, category, self.note.trim());
        Ok((record, grown))
    }

    fn resolve_category(&self) -> Result<String, ValidationError> {
        let selected = self.category.trim();
        let label = if selected.eq_ignore_ascii_case(OTHER_CATEGORY) {
            self.custom_category.as_deref().unwrap_or("").trim()
        } else {
            selected
        };
        if label.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(label.to_string())
    }
}
