//! Project and page types as served by the index endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A remote page collection. `count` is authoritative only at index-query
/// time; `pages` is filled by pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(alias = "projectName", default)]
    pub name: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Project {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            pages: Vec::new(),
        }
    }
}

/// One index entry. Everything besides `id` and `title` is kept as-is so the
/// persisted index carries the server's summary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }

    /// Output file name for this page's detail payload.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }

    /// Reason the id cannot be used as a file stem, if any.
    pub(crate) fn id_problem(&self) -> Option<&'static str> {
        stem_problem(&self.id)
    }
}

/// Reason `name` cannot be used as a single path component under the work
/// dir (page ids and project names), if any.
pub(crate) fn stem_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("empty name")
    } else if name == "." || name == ".." {
        Some("relative path component")
    } else if name.contains(['/', '\\', '\0']) {
        Some("contains a path separator")
    } else {
        None
    }
}
