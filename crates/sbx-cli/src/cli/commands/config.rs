//! `sbx config` – show where the config lives and what it resolves to.

use anyhow::Result;
use sbx_core::config::{self, FetchConfig};
use std::path::Path;

/// Explicit file if given, otherwise the XDG config (created on first use).
pub fn load_config(path: Option<&Path>) -> Result<FetchConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

pub fn run_config(path: Option<&Path>) -> Result<()> {
    let cfg = load_config(path)?;
    let shown = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", shown.display());
    print!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}
