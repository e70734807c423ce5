//! One fetch run: summary → pagination → partition → dispatch → join.
//!
//! Stages run strictly in sequence. Anything failing before dispatch returns
//! `Err` and no page detail is requested. After dispatch every group runs to
//! its own end and the result is a [`RunReport`].

use std::time::{Duration, Instant};

use crate::context::FetchContext;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::index::{fetch_index, paginate};
use crate::partition::{chunk_size, load_groups, WorkGroup};
use crate::progress::{emit, ProgressEvent, ProgressSender};
use crate::storage;
use crate::worker::{run_groups, GroupOutcome};

/// Stage reached by a run; logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    IndexFetched,
    Paginated,
    Partitioned,
    Dispatched,
    AllJoined,
}

/// Result of a run that got as far as dispatching groups.
#[derive(Debug)]
pub struct RunReport {
    /// Canonical project name as reported by the server.
    pub project: String,
    /// Page count from the summary query.
    pub count: usize,
    pub groups: Vec<GroupOutcome>,
    /// Wall time of the detail phase (dispatch to join).
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.groups.iter().all(GroupOutcome::is_success)
    }

    pub fn pages_written(&self) -> usize {
        self.groups.iter().map(|g| g.written).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.groups.iter().filter(|g| !g.is_success())
    }

    /// `Err(GroupsFailed)` if any group failed, otherwise the report itself.
    pub fn into_result(self) -> Result<RunReport, FetchError> {
        let failed = self.failures().count();
        if failed > 0 {
            return Err(FetchError::GroupsFailed {
                failed,
                total: self.groups.len(),
            });
        }
        Ok(self)
    }
}

fn enter(stage: Stage, project: &str) {
    tracing::info!(project, ?stage, "stage");
}

/// Mirrors `project` into the context's work dir. `cancel` lets the caller
/// stop the detail phase between pages; it is also tripped by the first
/// failing group when the config says `on_group_error = "abort"`.
pub fn fetch_project(
    ctx: &FetchContext,
    project: &str,
    cancel: &CancelToken,
    progress: Option<ProgressSender>,
) -> Result<RunReport, FetchError> {
    enter(Stage::Start, project);

    let summary = fetch_index(ctx, project)?;
    let name = summary.name.clone();
    let count = summary.count;
    enter(Stage::IndexFetched, &name);
    emit(
        progress.as_ref(),
        ProgressEvent::IndexFetched {
            name: name.clone(),
            count,
        },
    );

    paginate(ctx, summary)?;
    enter(Stage::Paginated, &name);

    let groups = load_groups(ctx.work_dir(), &name, ctx.config().multiplicity)?;
    enter(Stage::Partitioned, &name);
    let sizes: Vec<usize> = groups.iter().map(WorkGroup::len).collect();
    let total: usize = sizes.iter().sum();
    emit(
        progress.as_ref(),
        ProgressEvent::Partitioned {
            total,
            chunk: chunk_size(total, ctx.config().multiplicity),
            sizes,
        },
    );

    storage::create_dir(&ctx.project_dir(&name))?;
    let start = Instant::now();
    enter(Stage::Dispatched, &name);
    let outcomes = run_groups(
        ctx,
        &name,
        groups,
        ctx.config().max_workers,
        ctx.config().on_group_error,
        cancel,
        progress,
    );
    let elapsed = start.elapsed();
    enter(Stage::AllJoined, &name);

    let report = RunReport {
        project: name,
        count,
        groups: outcomes,
        elapsed,
    };
    if report.is_success() {
        tracing::info!(
            project = %report.project,
            pages = report.pages_written(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "run complete"
        );
    } else {
        for g in report.failures() {
            if let Some(e) = &g.error {
                tracing::error!(group = g.index, written = g.written, pages = g.pages, "group failed: {}", e);
            }
        }
    }
    Ok(report)
}
