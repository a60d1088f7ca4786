//! spendbook-core: expense records, the category registry, entry validation and
//! the ledger aggregator.

pub mod aggregate;
pub mod category;
pub mod entry;
pub mod format;
pub mod record;
pub mod time;

pub use aggregate::{compute_snapshot, AggregateSnapshot, Aggregation, SkippedRow};
pub use category::{CategorySet, DEFAULT_CATEGORIES, OTHER_CATEGORY};
pub use entry::{EntryForm, ValidationError, MAX_AMOUNT};
pub use record::{ExpenseRecord, LedgerRow, SkipReason, LEDGER_HEADER};
