//! Group workers: fetch and store page details, one group at a time.
//!
//! Within a group pages are fetched strictly in order and the first failure
//! ends the group. Groups never share files, so no locking is needed.

mod pool;

pub use pool::run_groups;

use crate::context::FetchContext;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::partition::WorkGroup;
use crate::progress::{emit, ProgressEvent, ProgressSender};
use crate::storage;

/// What happened to one work group.
#[derive(Debug)]
pub struct GroupOutcome {
    pub index: usize,
    /// Pages assigned to the group.
    pub pages: usize,
    /// Pages fetched and written before the group ended.
    pub written: usize,
    /// Why the group stopped early, if it did.
    pub error: Option<FetchError>,
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetches every page of `group` from `<base>/<project>/<title>` and writes it
/// to `<work_dir>/<project>/<id>.json`, stopping at the first error or when
/// `cancel` is tripped.
pub fn run_group(
    ctx: &FetchContext,
    project: &str,
    group: &WorkGroup,
    cancel: &CancelToken,
    progress: Option<&ProgressSender>,
) -> GroupOutcome {
    let out_dir = ctx.project_dir(project);
    emit(
        progress,
        ProgressEvent::GroupStarted {
            group: group.index,
            pages: group.len(),
        },
    );

    let mut written = 0;
    let mut error = None;
    for page in &group.pages {
        if cancel.is_cancelled() {
            error = Some(FetchError::Cancelled);
            break;
        }
        let url = ctx.endpoint().detail(project, &page.title);
        let result = ctx
            .get(&url)
            .and_then(|data| storage::write_bytes(&data, &page.file_name(), &out_dir));
        match result {
            Ok(path) => {
                written += 1;
                tracing::debug!(group = group.index, title = %page.title, path = %path.display(), "page saved");
                emit(
                    progress,
                    ProgressEvent::PageSaved {
                        group: group.index,
                        position: written,
                        id: page.id.clone(),
                        title: page.title.clone(),
                    },
                );
            }
            Err(e) => {
                tracing::warn!(group = group.index, title = %page.title, "page failed: {}", e);
                error = Some(e);
                break;
            }
        }
    }

    emit(
        progress,
        ProgressEvent::GroupFinished {
            group: group.index,
            written,
            error: error.as_ref().map(ToString::to_string),
        },
    );
    GroupOutcome {
        index: group.index,
        pages: group.len(),
        written,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::partition::plan_groups;
    use crate::test_support::{context, pages, MockApi};
    use std::sync::Arc;

    fn setup(api: MockApi) -> (Arc<MockApi>, tempfile::TempDir, FetchContext) {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(api);
        let ctx = context(Arc::clone(&api), dir.path(), 1000, 1);
        storage::create_dir(&ctx.project_dir("p")).unwrap();
        (api, dir, ctx)
    }

    #[test]
    fn writes_every_page_in_order() {
        let (api, dir, ctx) = setup(MockApi::new("p", pages(4)));
        let group = plan_groups(pages(4), 1).remove(0);

        let outcome = run_group(&ctx, "p", &group, &CancelToken::new(), None);
        assert!(outcome.is_success());
        assert_eq!(outcome.written, 4);

        let titles: Vec<_> = api.detail_requests();
        assert_eq!(titles[0], "http://api.test/api/pages/p/Title%200");
        assert_eq!(titles[3], "http://api.test/api/pages/p/Title%203");
        for page in &group.pages {
            let body = std::fs::read_to_string(dir.path().join("p").join(page.file_name())).unwrap();
            assert!(body.contains(&page.title));
        }
    }

    #[test]
    fn stops_at_first_failure() {
        let mut api = MockApi::new("p", pages(6));
        api.fail_titles.insert("Title 3".into());
        let (api, dir, ctx) = setup(api);
        let group = plan_groups(pages(6), 1).remove(0);

        let outcome = run_group(&ctx, "p", &group, &CancelToken::new(), None);
        assert_eq!(outcome.written, 3);
        assert_eq!(outcome.error.as_ref().unwrap().kind(), ErrorKind::Transport);
        assert_eq!(api.detail_requests().len(), 4);
        let out = dir.path().join("p");
        assert!(out.join("id0002.json").exists());
        assert!(!out.join("id0003.json").exists());
        assert!(!out.join("id0004.json").exists());
    }

    #[test]
    fn rerun_overwrites_with_identical_bytes() {
        let (_api, dir, ctx) = setup(MockApi::new("p", pages(3)));
        let group = plan_groups(pages(3), 1).remove(0);
        let path = dir.path().join("p").join("id0001.json");

        run_group(&ctx, "p", &group, &CancelToken::new(), None);
        let first = std::fs::read(&path).unwrap();
        run_group(&ctx, "p", &group, &CancelToken::new(), None);
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_output_dir_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(MockApi::new("p", pages(2)));
        let ctx = context(api, dir.path(), 1000, 1);
        let group = plan_groups(pages(2), 1).remove(0);
        let outcome = run_group(&ctx, "p", &group, &CancelToken::new(), None);
        assert_eq!(outcome.written, 0);
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::Storage);
    }

    #[test]
    fn cancelled_token_stops_before_fetching() {
        let (api, _dir, ctx) = setup(MockApi::new("p", pages(2)));
        let group = plan_groups(pages(2), 1).remove(0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = run_group(&ctx, "p", &group, &cancel, None);
        assert!(matches!(outcome.error, Some(FetchError::Cancelled)));
        assert!(api.detail_requests().is_empty());
    }

    #[test]
    fn reports_progress_events() {
        let (_api, _dir, ctx) = setup(MockApi::new("p", pages(2)));
        let group = plan_groups(pages(2), 1).remove(0);
        let (tx, mut rx) = tokio::sync::mpsc::channel(16);
        run_group(&ctx, "p", &group, &CancelToken::new(), Some(&tx));
        drop(tx);

        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ProgressEvent::GroupStarted { group: 0, pages: 2 });
        assert!(matches!(&events[2], ProgressEvent::PageSaved { position: 2, id, .. } if id == "id0001"));
        assert_eq!(
            events[3],
            ProgressEvent::GroupFinished {
                group: 0,
                written: 2,
                error: None
            }
        );
    }
}
