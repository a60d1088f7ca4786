//! spendbook-ledger: the append-only CSV ledger.

pub mod error;
pub mod store;

pub use error::LedgerError;
pub use store::LedgerStore;
