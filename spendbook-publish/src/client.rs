//! GitHub contents API client.
//!
//! Upload is create-or-update: a GET first fetches the blob `sha` of any file with
//! the same name, and the PUT carries it so the existing file is replaced instead of
//! the request being rejected.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{Credentials, Endpoint};
use crate::error::PublishError;

#[derive(Debug, Clone)]
pub struct Publisher {
    creds: Credentials,
    endpoint: Endpoint,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExistingContents {
    sha: Option<String>,
}

impl Publisher {
    pub fn new(creds: Credentials, endpoint: Endpoint) -> Result<Self, PublishError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", creds.token)).map_err(PublishError::InvalidToken)?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("spendbook/", env!("CARGO_PKG_VERSION")))
            .timeout(endpoint.timeout)
            .build()?;

        Ok(Self {
            creds,
            endpoint,
            http,
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/contents/{filename}`
    pub fn contents_url(&self, filename: &str) -> Result<Url, PublishError> {
        let c = &self.creds;
        join_segments(
            &self.endpoint.api_base,
            &["repos", c.owner.as_str(), c.repo.as_str(), "contents", filename],
        )
    }

    /// `{raw_base}/{owner}/{repo}/{branch}/{filename}`
    pub fn raw_url(&self, filename: &str) -> Result<Url, PublishError> {
        let c = &self.creds;
        join_segments(
            &self.endpoint.raw_base,
            &[c.owner.as_str(), c.repo.as_str(), self.endpoint.branch.as_str(), filename],
        )
    }

    /// Version marker of an existing remote file, if there is one.
    pub async fn existing_sha(&self, filename: &str) -> Result<Option<String>, PublishError> {
        let url = self.contents_url(filename)?;
        let resp = self
            .http
            .get(url)
            .query(&[("ref", self.endpoint.branch.as_str())])
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            debug!(status = %resp.status(), filename, "no existing remote file");
            return Ok(None);
        }
        let existing: ExistingContents = resp.json().await?;
        Ok(existing.sha)
    }

    /// Upload `path` under its file name and return the raw link to it.
    pub async fn publish(&self, path: &Path) -> Result<String, PublishError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PublishError::MissingFile(path.to_path_buf()))?;

        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PublishError::MissingFile(path.to_path_buf()));
            }
            Err(source) => {
                return Err(PublishError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let sha = self.existing_sha(filename).await?;
        let body = PutContents {
            message: format!("Upload {filename}"),
            content: STANDARD.encode(&bytes),
            branch: &self.endpoint.branch,
            sha,
        };

        let resp = self
            .http
            .put(self.contents_url(filename)?)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let message = resp.text().await.unwrap_or_default();
            return Err(PublishError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let url = self.raw_url(filename)?.to_string();
        info!(%url, bytes = bytes.len(), "published");
        Ok(url)
    }
}

fn join_segments(base: &str, segments: &[&str]) -> Result<Url, PublishError> {
    let mut url = Url::parse(base).map_err(|_| PublishError::InvalidEndpoint(base.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| PublishError::InvalidEndpoint(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(api_base: &str) -> Publisher {
        let creds = Credentials {
            owner: "someone".to_string(),
            repo: "reports".to_string(),
            token: "ghp_x".to_string(),
        };
        let endpoint = Endpoint {
            api_base: api_base.to_string(),
            ..Endpoint::default()
        };
        Publisher::new(creds, endpoint).unwrap()
    }

    #[test]
    fn test_urls() {
        let p = publisher("https://api.github.com/");
        assert_eq!(
            p.contents_url("report.png").unwrap().as_str(),
            "https://api.github.com/repos/someone/reports/contents/report.png"
        );
        assert_eq!(
            p.raw_url("report.png").unwrap().as_str(),
            "https://raw.githubusercontent.com/someone/reports/main/report.png"
        );
    }

    #[test]
    fn test_file_names_are_escaped() {
        let p = publisher("https://api.github.com");
        let url = p.contents_url("my report.png").unwrap();
        assert_eq!(url.path(), "/repos/someone/reports/contents/my%20report.png");
    }

    #[test]
    fn test_bad_base_is_invalid_endpoint() {
        let p = publisher("not a url");
        assert!(matches!(
            p.contents_url("x.png"),
            Err(PublishError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_token_with_control_characters_is_invalid_token() {
        let creds = Credentials {
            owner: "someone".to_string(),
            repo: "reports".to_string(),
            token: "ghp_x\nInjected: yes".to_string(),
        };
        let err = Publisher::new(creds, Endpoint::default()).unwrap_err();
        assert!(matches!(err, PublishError::InvalidToken(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let p = publisher("http://127.0.0.1:9");
        let err = p.publish(Path::new("/definitely/not/here.png")).await.unwrap_err();
        assert!(matches!(err, PublishError::MissingFile(_)));
    }
}
