use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Ledger store failures. Reads are strict: a bad line fails the whole read.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: line {line}: expected {expected} columns, found {found}", .path.display())]
    Format {
        path: PathBuf,
        line: u64,
        expected: u64,
        found: u64,
    },
    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl LedgerError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| LedgerError::Io { op, path, source }
    }

    pub(crate) fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = err.kind()
        {
            return LedgerError::Format {
                path,
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                expected: *expected_len,
                found: *len,
            };
        }
        LedgerError::Csv { path, source: err }
    }
}
