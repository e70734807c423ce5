//! Summary query: one `limit=1` request for `count` and the canonical name.

use crate::context::FetchContext;
use crate::error::FetchError;
use crate::model::{stem_problem, Project};

use super::decode_project;

/// Returns the project with `count` set and `pages` empty. Read-only.
///
/// The server's canonical name replaces `project` only when it is usable as a
/// single path component under the work dir; otherwise `project` is kept.
pub fn fetch_index(ctx: &FetchContext, project: &str) -> Result<Project, FetchError> {
    if let Some(reason) = stem_problem(project) {
        return Err(FetchError::Config(format!(
            "project name {:?}: {}",
            project, reason
        )));
    }
    let url = ctx.endpoint().summary(project);
    let data = ctx.get(&url)?;
    let summary = decode_project(&data, &format!("index summary of {}", project))?;

    let name = match stem_problem(&summary.name) {
        None => summary.name,
        Some(_) if summary.name.is_empty() => project.to_string(),
        Some(reason) => {
            tracing::warn!(
                requested = project,
                reported = %summary.name,
                reason,
                "ignoring unusable server project name"
            );
            project.to_string()
        }
    };
    tracing::info!(project = %name, count = summary.count, "fetched index summary");
    Ok(Project::new(name, summary.count))
}
