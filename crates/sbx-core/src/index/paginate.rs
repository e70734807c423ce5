//! Pull the full index in fixed-size rounds and commit it in one write.

use std::collections::HashSet;

use crate::context::FetchContext;
use crate::error::FetchError;
use crate::model::{stem_problem, Page, Project};
use crate::storage;

use super::decode_project;

/// Fetches every page summary of `project` (rounds of `page_limit`, sorted by
/// update time) and writes the whole project to `<work_dir>/<name>.json`.
///
/// Pages are buffered in memory; any failed round returns early and nothing
/// is written, so a persisted index is always complete.
pub fn paginate(ctx: &FetchContext, mut project: Project) -> Result<Project, FetchError> {
    if let Some(reason) = stem_problem(&project.name) {
        return Err(FetchError::Config(format!(
            "project name {:?}: {}",
            project.name, reason
        )));
    }
    let limit = ctx.config().page_limit;
    let mut pages: Vec<Page> = Vec::with_capacity(project.count);

    let mut skip = 0;
    while skip < project.count {
        let url = ctx.endpoint().index_page(&project.name, skip, limit);
        let data = ctx.get(&url)?;
        let round = decode_project(&data, &format!("index of {} at skip={}", project.name, skip))?;
        tracing::debug!(
            project = %project.name,
            skip,
            received = round.pages.len(),
            "index round"
        );
        pages.extend(round.pages);
        skip += limit;
    }

    validate(project.count, &pages)?;
    project.pages = pages;

    let data = serde_json::to_vec(&project)
        .map_err(|e| FetchError::decode(format!("index of {}", project.name), e))?;
    let path = storage::write_bytes(
        &data,
        &storage::index_file_name(&project.name),
        ctx.work_dir(),
    )?;
    tracing::info!(
        project = %project.name,
        pages = project.pages.len(),
        path = %path.display(),
        "index persisted"
    );
    Ok(project)
}

fn validate(count: usize, pages: &[Page]) -> Result<(), FetchError> {
    if pages.len() != count {
        return Err(FetchError::CountMismatch {
            expected: count,
            actual: pages.len(),
        });
    }
    let mut seen = HashSet::with_capacity(pages.len());
    for page in pages {
        if let Some(reason) = page.id_problem() {
            return Err(FetchError::InvalidPage {
                id: page.id.clone(),
                reason,
            });
        }
        if !seen.insert(page.id.as_str()) {
            return Err(FetchError::DuplicatePage {
                id: page.id.clone(),
            });
        }
    }
    Ok(())
}
