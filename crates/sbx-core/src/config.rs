use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FetchError;

/// What the remaining groups do once one group fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupErrorPolicy {
    /// Other groups keep going; the run is reported as failed at the end.
    #[default]
    Continue,
    /// First failure trips a shared token; other groups stop before their next page.
    Abort,
}

/// Global configuration loaded from `~/.config/sbx/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base of the pages API; the project name is appended as a path segment.
    pub base_url: String,
    /// Number of index entries requested per pagination round.
    pub page_limit: usize,
    /// Number of work groups the index is split into.
    pub multiplicity: usize,
    /// Directory holding `<project>.json` and `<project>/<id>.json`.
    pub work_dir: PathBuf,
    /// Cap on concurrently running group workers (None = one thread per group).
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub on_group_error: GroupErrorPolicy,
    /// TCP connect timeout per request, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_timeout_secs() -> u64 {
    60
}

pub const DEFAULT_BASE_URL: &str = "https://scrapbox.io/api/pages";
pub const DEFAULT_PAGE_LIMIT: usize = 1000;

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            multiplicity: 3,
            work_dir: PathBuf::from("_work"),
            max_workers: None,
            on_group_error: GroupErrorPolicy::Continue,
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FetchConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.page_limit == 0 {
            return Err(FetchError::Config("page_limit must be at least 1".into()));
        }
        if self.multiplicity == 0 {
            return Err(FetchError::Config("multiplicity must be at least 1".into()));
        }
        if self.max_workers == Some(0) {
            return Err(FetchError::Config("max_workers must be at least 1".into()));
        }
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| FetchError::Config(format!("base_url {:?}: {}", self.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Config(format!(
                "base_url {:?} cannot be a base URL",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Directory that receives one `<id>.json` per page of `project`.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.work_dir.join(project)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sbx")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file; it must exist.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: FetchConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}
