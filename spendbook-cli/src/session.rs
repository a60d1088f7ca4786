//! Interactive loop: a small menu over the same pipeline the subcommands use.
//!
//! The session owns the category registry, so custom labels entered here are
//! offered again for the rest of the session. Every failure is printed and the
//! loop carries on; end of input quits.

use anyhow::Result;
use chrono::NaiveDate;
use spendbook_core::time::today;
use spendbook_core::{CategorySet, EntryForm, OTHER_CATEGORY};
use std::io::{BufRead, Write};

use crate::pipeline::{run_report, run_trend, submit_entry, App};
use crate::view::{ledger_table, outcome_text};

const DEFAULT_CATEGORY: &str = "food";

enum Flow {
    Continue,
    Quit,
}

pub struct Session<R, W> {
    input: R,
    out: W,
    categories: CategorySet,
    clock: fn() -> NaiveDate,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            categories: CategorySet::default(),
            clock: today,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub async fn run(&mut self, app: &App) -> Result<()> {
        writeln!(self.out, "spendbook: ledger at {}", app.store.path().display())?;
        loop {
            writeln!(
                self.out,
                "\n[a]dd  [l]ist  [r]eport  [t]rend  [c]ategories  [q]uit"
            )?;
            let Some(choice) = self.prompt("choice")? else {
                break;
            };
            let step = match choice.to_lowercase().as_str() {
                "a" | "add" => self.add(app).await,
                "l" | "list" => self.list(app),
                "r" | "report" => self.report(app).await,
                "t" | "trend" => self.trend(app).await,
                "c" | "categories" => self.show_categories(),
                "q" | "quit" => break,
                "" => continue,
                other => {
                    writeln!(self.out, "unknown choice '{other}'")?;
                    continue;
                }
            };
            match step {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => writeln!(self.out, "error: {e:#}")?,
            }
        }
        writeln!(self.out, "bye")?;
        Ok(())
    }

    /// One line of input, trimmed. `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        let mut s = String::new();
        if self.input.read_line(&mut s)? == 0 {
            return Ok(None);
        }
        Ok(Some(s.trim().to_string()))
    }

    async fn add(&mut self, app: &App) -> Result<Flow> {
        let Some(date) = self.prompt("date [YYYY-MM-DD, blank for today]")? else {
            return Ok(Flow::Quit);
        };
        let Some(amount) = self.prompt("amount")? else {
            return Ok(Flow::Quit);
        };

        self.show_categories()?;
        let Some(choice) = self.prompt("category [number or name, blank for food]")? else {
            return Ok(Flow::Quit);
        };
        let category = self.pick_category(&choice);

        let mut custom_category = None;
        if category.eq_ignore_ascii_case(OTHER_CATEGORY) {
            let Some(custom) = self.prompt("custom category")? else {
                return Ok(Flow::Quit);
            };
            custom_category = Some(custom);
        }

        let Some(note) = self.prompt("note")? else {
            return Ok(Flow::Quit);
        };

        let form = EntryForm {
            date: Some(date),
            amount,
            category,
            custom_category,
            note,
        };
        let (record, grown) = submit_entry(app, &form, &self.categories, (self.clock)())?;
        self.categories = grown;
        writeln!(
            self.out,
            "Saved: {} {} {:.2}",
            record.date, record.category, record.amount
        )?;

        let Some(answer) = self.prompt("publish report now? [y/N]")? else {
            return Ok(Flow::Quit);
        };
        if matches!(answer.to_lowercase().as_str(), "y" | "yes") {
            return self.report(app).await;
        }
        Ok(Flow::Continue)
    }

    /// Blank picks the default, a number picks from the listing, a known label
    /// matches in any case, anything else is taken as typed.
    fn pick_category(&self, choice: &str) -> String {
        if choice.is_empty() {
            return DEFAULT_CATEGORY.to_string();
        }
        if let Some(label) = choice.parse::<usize>().ok().and_then(|n| self.categories.nth(n)) {
            return label.to_string();
        }
        self.categories
            .labels()
            .find(|label| label.eq_ignore_ascii_case(choice))
            .unwrap_or(choice)
            .to_string()
    }

    fn list(&mut self, app: &App) -> Result<Flow> {
        let rows = app.store.read_all()?;
        write!(self.out, "{}", ledger_table(&rows))?;
        Ok(Flow::Continue)
    }

    async fn report(&mut self, app: &App) -> Result<Flow> {
        let outcome = run_report(app, (self.clock)(), true).await?;
        write!(self.out, "{}", outcome_text(&outcome))?;
        Ok(Flow::Continue)
    }

    async fn trend(&mut self, app: &App) -> Result<Flow> {
        let outcome = run_trend(app, (self.clock)(), true).await?;
        write!(self.out, "{}", outcome_text(&outcome))?;
        Ok(Flow::Continue)
    }

    fn show_categories(&mut self) -> Result<Flow> {
        let listing: Vec<String> = self
            .categories
            .labels()
            .enumerate()
            .map(|(i, label)| format!("{}) {label}", i + 1))
            .collect();
        writeln!(self.out, "{}", listing.join("  "))?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use spendbook_publish::{PublishError, ENV_TOKEN};
    use std::io::Cursor;
    use tempfile::{tempdir, TempDir};

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn app(dir: &TempDir) -> App {
        let paths = Config::default().paths(dir.path());
        App::with_publisher(paths, Err(PublishError::MissingConfig(vec![ENV_TOKEN])))
    }

    async fn drive(app: &App, script: &str) -> (String, CategorySet) {
        let mut out = Vec::new();
        let mut session = Session::new(Cursor::new(script.as_bytes()), &mut out).with_clock(jan_first);
        session.run(app).await.unwrap();
        let categories = session.categories().clone();
        drop(session);
        (String::from_utf8(out).unwrap(), categories)
    }

    #[tokio::test]
    async fn test_add_by_number() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        // sorted registry: 1) food 2) other 3) shopping 4) transport
        let (out, _) = drive(&app, "a\n2024-01-01\n12.50\n4\nbus\nn\nq\n").await;
        assert!(out.contains("Saved: 2024-01-01 transport 12.50"));
        assert!(out.ends_with("bye\n"));

        let rows = app.store.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        let record = rows[0].parse().unwrap();
        assert_eq!(record.category, "transport");
        assert_eq!(record.note, "bus");
    }

    #[tokio::test]
    async fn test_blank_date_and_category_use_defaults() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        drive(&app, "a\n\n3\n\n\n\nq\n").await;

        let record = app.store.read_all().unwrap()[0].parse().unwrap();
        assert_eq!(record.date, jan_first());
        assert_eq!(record.category, "food");
        assert_eq!(record.note, "");
    }

    #[tokio::test]
    async fn test_custom_category_is_offered_afterwards() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (out, categories) = drive(&app, "a\n\n8\nother\nbooks\nnovel\nn\nc\nq\n").await;
        assert!(categories.contains("books"));
        assert!(out.contains("1) books  2) food"));

        let record = app.store.read_all().unwrap()[0].parse().unwrap();
        assert_eq!(record.category, "books");
    }

    #[tokio::test]
    async fn test_typed_labels_match_in_any_case() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (out, _) = drive(&app, "a\n\n8\nOther\nbooks\n\nn\na\n\n3\nFOOD\n\nn\nq\n").await;
        assert!(out.contains("custom category: "));
        assert!(!out.contains("error:"));

        let rows = app.store.read_all().unwrap();
        let categories: Vec<String> = rows.iter().map(|r| r.parse().unwrap().category).collect();
        assert_eq!(categories, vec!["books", "food"]);
    }

    #[tokio::test]
    async fn test_errors_are_printed_and_the_loop_goes_on() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (out, _) = drive(&app, "a\n\nabc\n1\n\nbogus\nq\n").await;
        assert!(out.contains("error: amount must be a number, got 'abc'"));
        assert!(out.contains("unknown choice 'bogus'"));
        assert!(!app.store.path().exists());
    }

    #[tokio::test]
    async fn test_future_date_is_rejected() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (out, _) = drive(&app, "a\n2024-02-01\n5\n1\n\nq\n").await;
        assert!(out.contains("in the future"));
        assert!(!app.store.path().exists());
    }

    #[tokio::test]
    async fn test_end_of_input_mid_entry_writes_nothing() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (out, _) = drive(&app, "a\n2024-01-01\n").await;
        assert!(out.ends_with("bye\n"));
        assert!(!app.store.path().exists());
    }

    #[tokio::test]
    async fn test_report_with_empty_ledger_and_list() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (out, _) = drive(&app, "r\nl\n").await;
        assert!(out.contains("No data to chart yet."));
        assert!(out.contains("0 record(s)"));
    }
}
