//! Bounded pool of worker threads pulling groups from a shared queue.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::config::GroupErrorPolicy;
use crate::context::FetchContext;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::partition::WorkGroup;
use crate::progress::ProgressSender;

use super::{run_group, GroupOutcome};

/// Runs every group and returns one outcome per group, ordered by group index.
///
/// `max_workers: None` starts one thread per group; `Some(n)` starts
/// `min(n, groups)` threads that take groups off a FIFO queue. Blocks until
/// every thread has exited. Under `GroupErrorPolicy::Abort` the first failure
/// trips `cancel`, and groups not yet started are reported as cancelled.
pub fn run_groups(
    ctx: &FetchContext,
    project: &str,
    groups: Vec<WorkGroup>,
    max_workers: Option<usize>,
    policy: GroupErrorPolicy,
    cancel: &CancelToken,
    progress: Option<ProgressSender>,
) -> Vec<GroupOutcome> {
    let count = groups.len();
    if count == 0 {
        return Vec::new();
    }
    let sizes: Vec<usize> = groups.iter().map(WorkGroup::len).collect();
    let num_workers = max_workers.unwrap_or(count).clamp(1, count);
    tracing::info!(groups = count, workers = num_workers, "dispatching groups");

    let work: Arc<Mutex<VecDeque<WorkGroup>>> = Arc::new(Mutex::new(groups.into_iter().collect()));
    let (tx, rx) = mpsc::channel::<GroupOutcome>();
    let mut handles = Vec::with_capacity(num_workers);
    for worker_id in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let ctx = ctx.clone();
        let project = project.to_string();
        let cancel = cancel.clone();
        let progress = progress.clone();
        handles.push(std::thread::spawn(move || loop {
            let next = work.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
            let Some(group) = next else {
                break;
            };
            let outcome = if cancel.is_cancelled() {
                GroupOutcome {
                    index: group.index,
                    pages: group.len(),
                    written: 0,
                    error: Some(FetchError::Cancelled),
                }
            } else {
                tracing::debug!(worker = worker_id, group = group.index, "group started");
                run_group(&ctx, &project, &group, &cancel, progress.as_ref())
            };
            if let Some(e) = &outcome.error {
                if policy == GroupErrorPolicy::Abort
                    && !matches!(e, FetchError::Cancelled)
                    && cancel.cancel()
                {
                    tracing::warn!(group = outcome.index, "aborting remaining groups");
                }
            }
            let _ = tx.send(outcome);
        }));
    }
    drop(tx);

    let mut slots: Vec<Option<GroupOutcome>> = (0..count).map(|_| None).collect();
    for outcome in rx {
        let index = outcome.index;
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(outcome);
        }
    }
    for h in handles {
        if h.join().is_err() {
            tracing::error!("group worker panicked");
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| GroupOutcome {
                index,
                pages: sizes[index],
                written: 0,
                error: Some(FetchError::WorkerLost { group: index }),
            })
        })
        .collect()
}
