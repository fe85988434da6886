//! Configuration file handling for the Spendbook client core.
//!
//! The configuration is a small JSON file holding the base URL of the
//! Spendbook REST API and an optional request timeout. Where the file lives
//! is up to the embedding application; the core only needs a path.

use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "spendbook";
const CONFIG_VERSION: u8 = 1;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The `Config` object represents the configuration of the client. You
/// instantiate it by providing the path to the config file, and it validates
/// the contents and pre-parses the API base URL.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    config_file: ConfigFile,
    api_base_url: url::Url,
}

impl Config {
    /// Creates an initial config file at `path` for the given API base URL
    /// and default settings, then returns the loaded configuration.
    pub async fn create(path: impl Into<PathBuf>, api_base_url: &str) -> Result<Self> {
        let path = path.into();
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_base_url: api_base_url.to_string(),
            request_timeout_secs: None,
        };
        config_file.save(&path).await?;
        let api_base_url = parse_base_url(&config_file.api_base_url)?;
        Ok(Self {
            path,
            config_file,
            api_base_url,
        })
    }

    /// Loads and validates the config file at `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config_file = ConfigFile::load(&path).await?;
        let api_base_url = parse_base_url(&config_file.api_base_url)?;
        Ok(Self {
            path,
            config_file,
            api_base_url,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The API base URL, normalized to end with a slash so endpoint paths
    /// join underneath it instead of replacing its last segment.
    pub fn api_base_url(&self) -> &url::Url {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.config_file
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

/// Represents the serialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spendbook",
///   "config_version": 1,
///   "api_base_url": "https://api.spendbook.example/v1",
///   "request_timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spendbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the Spendbook REST API
    api_base_url: String,

    /// Per-request timeout in seconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
}

impl ConfigFile {
    async fn load(path: &Path) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

/// Parses and normalizes the base URL. A missing trailing slash would make
/// `Url::join` replace the last path segment, so one is appended here.
fn parse_base_url(raw: &str) -> Result<url::Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let parsed = url::Url::parse(&raw)
        .with_context(|| format!("Invalid API base URL '{raw}'"))?;
    anyhow::ensure!(
        parsed.scheme() == "http" || parsed.scheme() == "https",
        "The API base URL must be http or https, got '{}'",
        parsed.scheme()
    );
    Ok(parsed)
}
