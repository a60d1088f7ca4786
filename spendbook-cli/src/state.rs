use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// `$HOME/.spendbook`, unless `--home`/`SPENDBOOK_HOME` says otherwise.
pub fn spendbook_home(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendbook"))
}

pub fn ensure_spendbook_home(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = spendbook_home(explicit)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Relative paths are taken from the spendbook home.
pub fn resolve(home: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        home.join(p)
    }
}
