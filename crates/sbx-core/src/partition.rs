//! Split the persisted index into contiguous work groups.

use std::path::Path;

use crate::error::FetchError;
use crate::index::load_index;
use crate::model::Page;

/// A contiguous run of index pages handled by one worker, in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkGroup {
    /// Position of this group in the plan (0-based).
    pub index: usize,
    pub pages: Vec<Page>,
}

impl WorkGroup {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Chunk size for `len` pages over `multiplicity` groups; never 0.
pub fn chunk_size(len: usize, multiplicity: usize) -> usize {
    (len / multiplicity.max(1)).max(1)
}

/// Cuts `pages` into `min(multiplicity, len)` groups of `chunk_size` pages;
/// the last group also takes the remainder.
///
/// 7 pages over 3 groups gives sizes `[2, 2, 3]`; 2 pages over 5 gives
/// `[1, 1]`; no pages gives no groups.
pub fn plan_groups(pages: Vec<Page>, multiplicity: usize) -> Vec<WorkGroup> {
    let len = pages.len();
    if len == 0 || multiplicity == 0 {
        return Vec::new();
    }
    let chunk = chunk_size(len, multiplicity);
    let group_count = multiplicity.min(len);

    let mut out = Vec::with_capacity(group_count);
    let mut rest = pages.into_iter();
    for index in 0..group_count {
        let take = if index + 1 == group_count {
            len - chunk * index
        } else {
            chunk
        };
        out.push(WorkGroup {
            index,
            pages: rest.by_ref().take(take).collect(),
        });
    }
    out
}

/// Loads `<work_dir>/<project>.json` and plans its groups.
pub fn load_groups(
    work_dir: &Path,
    project: &str,
    multiplicity: usize,
) -> Result<Vec<WorkGroup>, FetchError> {
    if multiplicity == 0 {
        return Err(FetchError::Config("multiplicity must be at least 1".into()));
    }
    let index = load_index(work_dir, project)?;
    let total = index.pages.len();
    let chunk = chunk_size(total, multiplicity);
    tracing::info!(project, total, chunk, "partitioning index");

    let groups = plan_groups(index.pages, multiplicity);
    for g in &groups {
        tracing::debug!(group = g.index, size = g.len(), "group planned");
    }
    let planned: usize = groups.iter().map(WorkGroup::len).sum();
    tracing::info!(groups = groups.len(), pages = planned, "pages to be fetched");
    Ok(groups)
}
