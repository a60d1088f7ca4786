//! Report pipeline: ledger -> aggregate -> render -> publish -> share code.
//!
//! Stages run one after another. A failed stage stops the pipeline and whatever the
//! earlier stages wrote (ledger row, local image) stays in place.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendbook_core::{compute_snapshot, Aggregation, CategorySet, EntryForm, ExpenseRecord, SkippedRow};
use spendbook_ledger::LedgerStore;
use spendbook_publish::{Credentials, Endpoint, PublishError, Publisher};
use spendbook_report::{encode_as_scannable_image, ReportRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::Paths;

/// Everything one process needs to serve user actions.
pub struct App {
    pub store: LedgerStore,
    pub paths: Paths,
    publisher: Result<Publisher, Arc<PublishError>>,
    renderer: OnceCell<ReportRenderer>,
}

/// What became of a rendered artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishStep {
    /// Caller asked for a local render only.
    Disabled,
    /// Credentials are missing; the message names them.
    NotConfigured(String),
    Published { url: String, qr: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Nothing to chart for the reference date. No image was written.
    NoData { skipped: Vec<SkippedRow> },
    Rendered {
        image: PathBuf,
        skipped: Vec<SkippedRow>,
        publish: PublishStep,
    },
}

impl App {
    /// Credentials are resolved once here; a missing one only matters when
    /// something is published.
    pub fn new(paths: Paths, endpoint: Endpoint) -> Self {
        let publisher = Credentials::from_env().and_then(|creds| Publisher::new(creds, endpoint));
        Self::with_publisher(paths, publisher)
    }

    pub fn with_publisher(paths: Paths, publisher: Result<Publisher, PublishError>) -> Self {
        if let Err(e) = &publisher {
            debug!(error = %e, "publishing unavailable");
        }
        Self {
            store: LedgerStore::new(&paths.ledger),
            paths,
            publisher: publisher.map_err(Arc::new),
            renderer: OnceCell::new(),
        }
    }

    async fn renderer(&self) -> Result<&ReportRenderer> {
        self.renderer
            .get_or_try_init(|| async { ReportRenderer::new(&self.paths.font) })
            .await
            .context("load report font")
    }

    pub fn aggregate(&self, as_of: NaiveDate) -> Result<Aggregation> {
        let rows = self
            .store
            .read_all()
            .with_context(|| format!("read ledger {}", self.store.path().display()))?;
        Ok(compute_snapshot(&rows, as_of))
    }
}

/// Validate `form` and append the record. The ledger is untouched on failure.
pub fn submit_entry(
    app: &App,
    form: &EntryForm,
    categories: &CategorySet,
    today: NaiveDate,
) -> Result<(ExpenseRecord, CategorySet)> {
    let (record, grown) = form.validate(categories, today)?;
    app.store
        .append(&record)
        .with_context(|| format!("append to {}", app.store.path().display()))?;
    info!(date = %record.date, amount = record.amount, category = %record.category, "expense added");
    Ok((record, grown))
}

pub async fn run_report(app: &App, as_of: NaiveDate, publish: bool) -> Result<ReportOutcome> {
    let aggregation = app.aggregate(as_of)?;
    let Some(snapshot) = aggregation.chartable() else {
        return Ok(ReportOutcome::NoData {
            skipped: aggregation.skipped,
        });
    };

    let image = app.paths.report_image.clone();
    app.renderer()
        .await?
        .render_report(snapshot, &image)
        .with_context(|| format!("render {}", image.display()))?;

    let publish = if publish {
        share(app, &image).await?
    } else {
        PublishStep::Disabled
    };
    Ok(ReportOutcome::Rendered {
        image,
        skipped: aggregation.skipped,
        publish,
    })
}

/// Stand-alone daily trend chart over the whole ledger.
pub async fn run_trend(app: &App, as_of: NaiveDate, publish: bool) -> Result<ReportOutcome> {
    let aggregation = app.aggregate(as_of)?;
    if !aggregation.has_history() {
        return Ok(ReportOutcome::NoData {
            skipped: aggregation.skipped,
        });
    }

    let image = app.paths.trend_image.clone();
    app.renderer()
        .await?
        .render_trend(&aggregation.snapshot.daily_totals, &image)
        .with_context(|| format!("render {}", image.display()))?;

    let publish = if publish {
        share(app, &image).await?
    } else {
        PublishStep::Disabled
    };
    Ok(ReportOutcome::Rendered {
        image,
        skipped: aggregation.skipped,
        publish,
    })
}

/// Upload `artifact` and write the share code for its link.
///
/// Missing credentials are an outcome, not an error. A failed upload is an error.
pub async fn share(app: &App, artifact: &Path) -> Result<PublishStep> {
    let publisher = match &app.publisher {
        Ok(p) => p,
        Err(e) if e.is_config() => return Ok(PublishStep::NotConfigured(e.to_string())),
        Err(e) => return Err(anyhow::Error::new(Arc::clone(e)).context("publishing is unavailable")),
    };

    let url = publisher
        .publish(artifact)
        .await
        .with_context(|| format!("publish {}", artifact.display()))?;

    let qr = app.paths.qr_image.clone();
    encode_as_scannable_image(&url, &qr)?;
    Ok(PublishStep::Published { url, qr })
}
