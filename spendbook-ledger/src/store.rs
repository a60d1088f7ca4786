//! CSV-backed ledger store.
//!
//! File layout: a header row `date,amount,category,note`, then one expense per line
//! in the order it was appended. Lines are never rewritten or removed.

use spendbook_core::{ExpenseRecord, LedgerRow, LEDGER_HEADER};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::LedgerError;

#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row if it is missing or empty.
    ///
    /// Returns `true` when the header was written. Existing content is never touched.
    pub fn initialize(&self) -> Result<bool, LedgerError> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > 0 => return Ok(false),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(dir).map_err(LedgerError::io("create", dir))?;
                }
            }
            Err(e) => return Err(LedgerError::io("stat", &self.path)(e)),
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(LedgerError::io("open", &self.path))?;
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(LEDGER_HEADER)
            .map_err(|e| LedgerError::from_csv(&self.path, e))?;
        wtr.flush().map_err(LedgerError::io("write", &self.path))?;

        debug!(path = %self.path.display(), "initialized ledger");
        Ok(true)
    }

    /// Append one record as a new line.
    pub fn append(&self, record: &ExpenseRecord) -> Result<(), LedgerError> {
        self.initialize()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(LedgerError::io("open", &self.path))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.write_record(record.to_row().as_fields())
            .map_err(|e| LedgerError::from_csv(&self.path, e))?;
        wtr.flush().map_err(LedgerError::io("write", &self.path))?;

        debug!(date = %record.date, amount = record.amount, category = %record.category, "appended expense");
        Ok(())
    }

    /// Every row after the header, in append order.
    ///
    /// A missing file reads as an empty ledger. A line with the wrong number of
    /// columns fails the whole read.
    pub fn read_all(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LedgerError::io("open", &self.path)(e)),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(file);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| LedgerError::from_csv(&self.path, e))?;
            let field = |i: usize| record.get(i).unwrap_or("").to_string();
            rows.push(LedgerRow {
                date: field(0),
                amount: field(1),
                category: field(2),
                note: field(3),
            });
        }

        debug!(path = %self.path.display(), rows = rows.len(), "read ledger");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(date: (i32, u32, u32), amount: f64, category: &str, note: &str) -> ExpenseRecord {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        ExpenseRecord::new(date, amount, category, note)
    }

    #[test]
    fn test_fresh_store_single_append() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("expense_data.csv"));
        assert!(store.initialize().unwrap());

        store.append(&record((2024, 1, 1), 12.50, "food", "lunch")).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        let parsed = rows[0].parse().unwrap();
        assert_eq!(parsed.amount, 12.50);
        assert_eq!(parsed.category, "food");
        assert_eq!(parsed.note, "lunch");

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("date,amount,category,note\n"));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("none.csv"));
        assert!(store.read_all().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger.csv"));
        store.initialize().unwrap();
        store.append(&record((2024, 1, 1), 3.0, "food", "")).unwrap();
        let before = fs::read(store.path()).unwrap();

        assert!(!store.initialize().unwrap());
        assert!(!store.initialize().unwrap());
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_initialize_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("a/b/ledger.csv"));
        assert!(store.initialize().unwrap());
        assert!(store.path().exists());
    }

    #[test]
    fn test_append_without_initialize_writes_header() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger.csv"));
        store.append(&record((2024, 1, 1), 1.0, "food", "")).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "date,amount,category,note\n2024-01-01,1,food,\n");
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "").unwrap();
        let store = LedgerStore::new(&path);
        assert!(store.initialize().unwrap());
        store.append(&record((2024, 1, 1), 1.0, "food", "")).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_wrong_column_count_fails_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(
            &path,
            "date,amount,category,note\n2024-01-01,1,food,\n2024-01-02,2,food\n",
        )
        .unwrap();

        let err = LedgerStore::new(&path).read_all().unwrap_err();
        match err {
            LedgerError::Format {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_values_still_read() {
        // strict on shape only; values are the aggregator's concern
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "date,amount,category,note\nnot-a-date,abc,food,x\n").unwrap();
        let rows = LedgerStore::new(&path).read_all().unwrap();
        assert_eq!(rows, vec![LedgerRow::new("not-a-date", "abc", "food", "x")]);
    }

    #[test]
    fn test_append_to_unwritable_path_is_io_error() {
        let dir = tempdir().unwrap();
        // a directory where the file should be
        let path = dir.path().join("ledger.csv");
        fs::create_dir(&path).unwrap();
        let err = LedgerStore::new(&path)
            .append(&record((2024, 1, 1), 1.0, "food", ""))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }), "got {err:?}");
    }
}
