//! CLI command handlers, one file per command.

mod config;
mod fetch;

pub use config::{load_config, run_config};
pub use fetch::{event_lines, run_fetch, FetchArgs};
