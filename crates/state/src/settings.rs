//! `sbmig.config.json` support.
//!
//! Settings are layered with the following precedence:
//! CLI arguments > Environment variables > Config file > Defaults
//!
//! ## Configuration File Format
//!
//! ```json
//! {
//!   "spaceId": "12345",
//!   "oauthToken": "secret",
//!   "apiUrl": "https://mapi.storyblok.com/v1",
//!   "perPage": 100,
//!   "concurrency": 8,
//!   "requestTimeoutSecs": 30,
//!   "schemaFileExt": "sb.json",
//!   "datasourceExt": "sb.datasource.json",
//!   "componentsDirectories": ["src", "storyblok"],
//!   "externalDirectory": "node_modules",
//!   "workingDirectory": "sbmig"
//! }
//! ```

use crate::env;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use sbmig_sync::DEFAULT_API_URL;
use sbmig_sync::{DEFAULT_CONCURRENCY, DEFAULT_PER_PAGE};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings as written in the config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub space_id: Option<String>,
    pub oauth_token: Option<String>,
    pub api_url: Option<String>,
    pub per_page: Option<usize>,
    pub concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub schema_file_ext: Option<String>,
    pub datasource_ext: Option<String>,
    pub components_directories: Option<Vec<PathBuf>>,
    pub external_directory: Option<PathBuf>,
    pub working_directory: Option<PathBuf>,
}

/// Loads the config file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but
/// fails to parse.
pub fn load_settings(path: &Path) -> Result<Option<Settings>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(Some(settings))
}

/// Values already merged from CLI flags and their environment variables.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub space_id: Option<String>,
    pub oauth_token: Option<String>,
    pub api_url: Option<String>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    space_id: Option<String>,
    oauth_token: Option<String>,
    pub api_url: String,
    pub per_page: usize,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub schema_file_ext: String,
    pub datasource_ext: String,
    pub components_directories: Vec<PathBuf>,
    pub external_directory: PathBuf,
    pub working_directory: PathBuf,
}

impl RuntimeConfig {
    /// Layers `overrides`, environment and `settings` over the defaults.
    pub fn resolve(overrides: Overrides, settings: Settings) -> Self {
        Self {
            space_id: overrides.space_id.or(settings.space_id),
            oauth_token: overrides.oauth_token.or(settings.oauth_token),
            api_url: overrides
                .api_url
                .or(settings.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            per_page: env::env_per_page()
                .or(settings.per_page)
                .unwrap_or(DEFAULT_PER_PAGE),
            concurrency: env::env_concurrency()
                .or(settings.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            request_timeout: Duration::from_secs(
                env::env_timeout_secs()
                    .or(settings.request_timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            schema_file_ext: settings.schema_file_ext.unwrap_or_else(|| "sb.json".into()),
            datasource_ext: settings
                .datasource_ext
                .unwrap_or_else(|| "sb.datasource.json".into()),
            components_directories: settings
                .components_directories
                .unwrap_or_else(|| vec![PathBuf::from("src"), PathBuf::from("storyblok")]),
            external_directory: settings
                .external_directory
                .unwrap_or_else(|| PathBuf::from("node_modules")),
            working_directory: env::env_working_dir()
                .or(settings.working_directory)
                .unwrap_or_else(|| PathBuf::from("sbmig")),
        }
    }

    /// Space id; required by every command that talks to the API.
    pub fn space_id(&self) -> Result<&str> {
        self.space_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "space id is not set (use --space-id, STORYBLOK_SPACE_ID \
                     or \"spaceId\" in the config file)"
                )
            })
    }

    /// Management token; required by every command that talks to the API.
    pub fn oauth_token(&self) -> Result<&str> {
        self.oauth_token
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "management token is not set (use --token, STORYBLOK_OAUTH_TOKEN \
                     or \"oauthToken\" in the config file)"
                )
            })
    }
}
