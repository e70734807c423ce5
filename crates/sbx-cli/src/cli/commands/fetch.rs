//! `sbx fetch` – mirror a project into the work directory.

use anyhow::{Context, Result};
use sbx_core::config::{FetchConfig, GroupErrorPolicy};
use sbx_core::control::CancelToken;
use sbx_core::progress::ProgressEvent;
use sbx_core::{fetch_project, storage, FetchContext};
use std::path::{Path, PathBuf};

use super::load_config;

/// Command-line overrides for one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub project: String,
    pub work_dir: Option<PathBuf>,
    pub groups: Option<usize>,
    pub workers: Option<usize>,
    pub abort_on_error: bool,
}

impl FetchArgs {
    /// Flags win over the config file.
    pub fn apply(&self, cfg: &mut FetchConfig) {
        if let Some(dir) = &self.work_dir {
            cfg.work_dir = dir.clone();
        }
        if let Some(n) = self.groups {
            cfg.multiplicity = n;
        }
        if let Some(n) = self.workers {
            cfg.max_workers = Some(n);
        }
        if self.abort_on_error {
            cfg.on_group_error = GroupErrorPolicy::Abort;
        }
    }
}

/// Console lines for one progress event.
pub fn event_lines(event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::IndexFetched { name, count } => {
            vec![format!("fetch all pages, {} : {}", name, count)]
        }
        ProgressEvent::Partitioned {
            total,
            chunk,
            sizes,
        } => {
            let mut lines = vec![format!("total: {}, chunk: {}", total, chunk)];
            lines.extend(
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| format!("  group {}: {} pages", i, n)),
            );
            lines.push(format!(
                "pages to be fetched: {}",
                sizes.iter().sum::<usize>()
            ));
            lines
        }
        ProgressEvent::GroupStarted { group, pages } => {
            vec![format!("group {}: started, {} pages", group, pages)]
        }
        ProgressEvent::PageSaved {
            group,
            position,
            title,
            ..
        } => vec![format!("  [{}] {:>5} {}", group, position, title)],
        ProgressEvent::GroupFinished {
            group,
            written,
            error: Some(e),
        } => vec![format!(
            "group {}: failed after {} pages: {}",
            group, written, e
        )],
        ProgressEvent::GroupFinished { group, written, .. } => {
            vec![format!("group {}: done, {} pages", group, written)]
        }
    }
}

pub async fn run_fetch(config_path: Option<&Path>, args: FetchArgs) -> Result<()> {
    let mut cfg = load_config(config_path)?;
    args.apply(&mut cfg);
    storage::create_dir(&cfg.work_dir)
        .with_context(|| format!("cannot prepare work dir {}", cfg.work_dir.display()))?;

    let ctx = FetchContext::with_curl(cfg)?;
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressEvent>(256);
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            for line in event_lines(&event) {
                println!("{}", line);
            }
        }
    });

    // Ctrl-C stops every group before its next page.
    let cancel = CancelToken::new();
    let on_interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() && cancel.cancel() {
                eprintln!("interrupted, stopping after the current pages");
                tracing::warn!("interrupted by user");
            }
        })
    };

    let project = args.project.clone();
    let run_cancel = cancel.clone();
    let result = tokio::task::spawn_blocking(move || {
        fetch_project(&ctx, &project, &run_cancel, Some(progress_tx))
    })
    .await;
    on_interrupt.abort();
    // The sender is gone with the pipeline; flush what it reported, even on error.
    let _ = printer.await;
    let report = result
        .context("fetch task panicked")?
        .with_context(|| format!("fetching project {}", args.project))?;

    println!(
        "{} of {} pages written in {} groups",
        report.pages_written(),
        report.count,
        report.groups.len()
    );
    println!("took {:.2?}", report.elapsed);
    tracing::info!(
        project = %report.project,
        pages = report.pages_written(),
        cancelled = cancel.is_cancelled(),
        "fetch finished"
    );

    report.into_result()?;
    Ok(())
}
