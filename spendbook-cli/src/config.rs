use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spendbook_publish::Endpoint;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::resolve;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerSection,
    pub report: ReportSection,
    pub publish: PublishSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub image: PathBuf,
    pub trend_image: PathBuf,
    pub qr_image: PathBuf,
    /// TrueType/OpenType font used for every label
    pub font: PathBuf,
}

/// Where uploads go. Credentials are never stored here; they come from
/// `GITHUB_USERNAME`, `GITHUB_REPO` and `GITHUB_TOKEN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSection {
    pub branch: String,
    pub api_base: String,
    pub raw_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Used when RUST_LOG is unset
    pub level: String,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from("expense_data.csv"),
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            image: PathBuf::from("report.png"),
            trend_image: PathBuf::from("daily_trend.png"),
            qr_image: PathBuf::from("share_qr.png"),
            font: PathBuf::from("NotoSansCJKsc-Regular.otf"),
        }
    }
}

impl Default for PublishSection {
    fn default() -> Self {
        let endpoint = Endpoint::default();
        Self {
            branch: endpoint.branch,
            api_base: endpoint.api_base,
            raw_base: endpoint.raw_base,
            timeout_secs: endpoint.timeout.as_secs(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Every file location, resolved against the spendbook home.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub ledger: PathBuf,
    pub report_image: PathBuf,
    pub trend_image: PathBuf,
    pub qr_image: PathBuf,
    pub font: PathBuf,
}

impl Config {
    pub fn paths(&self, home: &Path) -> Paths {
        Paths {
            ledger: resolve(home, &self.ledger.file),
            report_image: resolve(home, &self.report.image),
            trend_image: resolve(home, &self.report.trend_image),
            qr_image: resolve(home, &self.report.qr_image),
            font: resolve(home, &self.report.font),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            api_base: self.publish.api_base.clone(),
            raw_base: self.publish.raw_base.clone(),
            branch: self.publish.branch.clone(),
            timeout: Duration::from_secs(self.publish.timeout_secs.max(1)),
        }
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
