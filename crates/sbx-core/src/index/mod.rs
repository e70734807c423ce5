//! Project index: summary query, pagination and the persisted index file.
//!
//! `fetch_index` learns how many pages exist; `paginate` pulls them all in
//! `page_limit`-sized rounds and commits `<work_dir>/<project>.json` only after
//! every round succeeded; `load_index` reads that file back for partitioning.

mod fetch;
mod paginate;

pub use fetch::fetch_index;
pub use paginate::paginate;

use std::path::Path;

use crate::error::FetchError;
use crate::model::Project;
use crate::storage;

/// Decode an index-endpoint response body.
pub(crate) fn decode_project(data: &[u8], what: &str) -> Result<Project, FetchError> {
    serde_json::from_slice(data).map_err(|e| FetchError::decode(what, e))
}

/// Read the persisted index for `project` from `work_dir`.
pub fn load_index(work_dir: &Path, project: &str) -> Result<Project, FetchError> {
    let name = storage::index_file_name(project);
    let data = storage::read_bytes(&name, work_dir)?;
    decode_project(&data, &work_dir.join(&name).display().to_string())
}
