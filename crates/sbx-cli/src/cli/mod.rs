//! CLI for sbx, the paginated project mirror.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_config, run_fetch, FetchArgs};

/// Top-level CLI for sbx.
#[derive(Debug, Parser)]
#[command(name = "sbx")]
#[command(about = "sbx: mirror every page of a project into a local work directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the page index and every page of a project.
    Fetch {
        /// Project name.
        #[arg(short = 'p', long, default_value = "help-jp")]
        project: String,

        /// Work directory (overrides `work_dir` from the config file).
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,

        /// Split the index into N groups fetched concurrently.
        #[arg(long, value_name = "N")]
        groups: Option<usize>,

        /// Run at most N group workers at once.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Stop every group once one of them fails.
        #[arg(long)]
        abort_on_error: bool,

        /// Read configuration from this file instead of the default location.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print the config file path and the effective configuration.
    Config {
        /// Read configuration from this file instead of the default location.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch {
                project,
                work_dir,
                groups,
                workers,
                abort_on_error,
                config,
            } => {
                let args = FetchArgs {
                    project,
                    work_dir,
                    groups,
                    workers,
                    abort_on_error,
                };
                run_fetch(config.as_deref(), args).await?;
            }
            CliCommand::Config { config } => run_config(config.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
