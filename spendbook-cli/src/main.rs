use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use spendbook_core::time::{parse_ledger_date, today};
use spendbook_core::{CategorySet, EntryForm};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;
mod session;
mod state;
mod view;

use config::{config_path, init_config, load_config, Config};
use pipeline::{run_report, run_trend, share, submit_entry, App, PublishStep};

#[derive(Parser, Debug)]
#[command(
    name = "spendbook",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SPENDBOOK_BUILD_REV"), ")"),
    about = "Personal expense ledger with shareable daily reports"
)]
struct Cli {
    /// Data directory (default: ~/.spendbook)
    #[arg(long, global = true, env = "SPENDBOOK_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the ledger file with its header row
    Init,

    /// Record one expense
    Add {
        /// Amount spent
        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Category label; `other` requires --custom
        #[arg(long, default_value = "food")]
        category: String,

        /// Custom label used when the category is `other`
        #[arg(long)]
        custom: Option<String>,

        #[arg(long, default_value = "")]
        note: String,

        /// Render and publish the report afterwards
        #[arg(long)]
        report: bool,
    },

    /// Show every ledger row
    List,

    /// Month and day totals without drawing anything
    Summary {
        /// Reference date (default: today)
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,

        /// Print the full aggregation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Draw today's report, upload it and write its share code
    Report {
        /// Reference date (default: today)
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,

        /// Only write the local image
        #[arg(long)]
        no_publish: bool,
    },

    /// Draw the daily trend over the whole ledger
    Trend {
        #[arg(long)]
        no_publish: bool,
    },

    /// Upload any local file and write its share code
    Publish { file: PathBuf },

    /// List the built-in categories
    Categories,

    /// Interactive entry loop
    Session,

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config.toml if there is none
    Init,
    /// Print the effective configuration
    Show,
    /// Print where config.toml lives
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = state::ensure_spendbook_home(cli.home.as_deref())?;

    // .env in the working directory wins over the one in the data directory
    dotenvy::dotenv().ok();
    dotenvy::from_path(home.join(".env")).ok();

    let cfg = load_config(&home)?;
    init_tracing(&cfg.log.level);

    let app = App::new(cfg.paths(&home), cfg.endpoint());

    match cli.command {
        Command::Init => {
            if app.store.initialize()? {
                println!("Created {}", app.store.path().display());
            } else {
                println!("Ledger already exists: {}", app.store.path().display());
            }
        }

        Command::Add {
            amount,
            date,
            category,
            custom,
            note,
            report,
        } => {
            let form = EntryForm {
                date,
                amount,
                category,
                custom_category: custom,
                note,
            };
            let as_of = today();
            let (record, _) = submit_entry(&app, &form, &CategorySet::default(), as_of)?;
            println!(
                "Saved: {} {} {:.2}",
                record.date, record.category, record.amount
            );
            if report {
                let outcome = run_report(&app, as_of, true).await?;
                print!("{}", view::outcome_text(&outcome));
            }
        }

        Command::List => {
            let rows = app.store.read_all()?;
            print!("{}", view::ledger_table(&rows));
        }

        Command::Summary { as_of, json } => {
            let aggregation = app.aggregate(as_of.unwrap_or_else(today))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&aggregation)?);
            } else {
                print!("{}", view::summary_text(&aggregation));
            }
        }

        Command::Report { as_of, no_publish } => {
            let outcome = run_report(&app, as_of.unwrap_or_else(today), !no_publish).await?;
            print!("{}", view::outcome_text(&outcome));
        }

        Command::Trend { no_publish } => {
            let outcome = run_trend(&app, today(), !no_publish).await?;
            print!("{}", view::outcome_text(&outcome));
        }

        Command::Publish { file } => match share(&app, &file).await? {
            PublishStep::Published { url, qr } => {
                println!("Uploaded: {url}");
                println!("Share code: {}", qr.display());
            }
            PublishStep::NotConfigured(msg) => println!("Not uploaded: {msg}"),
            PublishStep::Disabled => {}
        },

        Command::Categories => {
            for label in CategorySet::default().labels() {
                println!("{label}");
            }
        }

        Command::Session => {
            let stdin = std::io::stdin();
            let mut session = session::Session::new(stdin.lock(), std::io::stdout());
            session.run(&app).await?;
        }

        Command::Config { command } => run_config(&command, &home, &cfg)?,
    }

    Ok(())
}

fn run_config(command: &ConfigCommand, home: &std::path::Path, cfg: &Config) -> Result<()> {
    match command {
        ConfigCommand::Init => init_config(home)?,
        ConfigCommand::Show => {
            let s = toml::to_string_pretty(cfg).context("serialize config")?;
            print!("{s}");
        }
        ConfigCommand::Path => println!("{}", config_path(home).display()),
    }
    Ok(())
}

/// Logs go to stderr so command output stays clean. RUST_LOG overrides the
/// configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_ledger_date(s).map_err(|_| format!("'{s}' is not a YYYY-MM-DD date"))
}
