//! Where uploads go and who they are made as.

use std::fmt;
use std::time::Duration;

use crate::error::PublishError;

pub const ENV_OWNER: &str = "GITHUB_USERNAME";
pub const ENV_REPO: &str = "GITHUB_REPO";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Account, repository and token for the contents API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read `GITHUB_USERNAME`, `GITHUB_REPO` and `GITHUB_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self, PublishError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Credentials::from_env`] over any key lookup. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PublishError> {
        let mut missing = Vec::new();
        let mut get = |key: &'static str| {
            let value = lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let owner = get(ENV_OWNER);
        let repo = get(ENV_REPO);
        let token = get(ENV_TOKEN);

        if !missing.is_empty() {
            return Err(PublishError::MissingConfig(missing));
        }
        Ok(Self { owner, repo, token })
    }
}

/// Remote service locations and request limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub api_base: String,
    pub raw_base: String,
    pub branch: String,
    pub timeout: Duration,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
