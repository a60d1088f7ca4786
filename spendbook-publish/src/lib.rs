//! spendbook-publish: upload artifacts to a GitHub repository and hand back a raw link.

pub mod client;
pub mod config;
pub mod error;

pub use client::Publisher;
pub use config::{Credentials, Endpoint, ENV_OWNER, ENV_REPO, ENV_TOKEN};
pub use error::PublishError;
