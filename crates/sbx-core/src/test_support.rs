//! In-memory pages API for unit tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::json;
use url::Url;

use crate::config::FetchConfig;
use crate::context::FetchContext;
use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::model::Page;
use crate::transport::Transport;

pub(crate) const BASE: &str = "http://api.test/api/pages";

/// Serves one project: `?limit=1` summaries, paginated index and per-title details.
#[derive(Default)]
pub(crate) struct MockApi {
    pub name: String,
    pub pages: Vec<Page>,
    /// Overrides the advertised `count` (defaults to `pages.len()`).
    pub count: Option<usize>,
    pub fail_titles: HashSet<String>,
    pub fail_index_skip: Option<usize>,
    pub malformed_index: bool,
    pub requests: Mutex<Vec<String>>,
}

pub(crate) fn pages(n: usize) -> Vec<Page> {
    (0..n)
        .map(|i| {
            let mut p = Page::new(format!("id{:04}", i), format!("Title {}", i));
            p.extra.insert("views".into(), json!(i));
            p
        })
        .collect()
}

impl MockApi {
    pub fn new(name: &str, pages: Vec<Page>) -> Self {
        Self {
            name: name.to_string(),
            pages,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn index_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| u.contains('?'))
            .collect()
    }

    pub fn detail_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| !u.contains('?'))
            .collect()
    }

    fn error(url: &str) -> FetchError {
        FetchError::Http {
            url: url.to_string(),
            status: 500,
        }
    }
}

impl Transport for MockApi {
    fn get(&self, raw: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(raw.to_string());
        let url = Url::parse(raw).map_err(|_| Self::error(raw))?;
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| {
            query
                .iter()
                .find(|(key, _)| key == k)
                .and_then(|(_, v)| v.parse::<usize>().ok())
        };
        let title = if url.query().is_none() {
            let endpoint = Endpoint::new(BASE).unwrap();
            let page = self
                .pages
                .iter()
                .find(|p| endpoint.detail(&self.name, &p.title) == raw)
                .ok_or_else(|| Self::error(raw))?;
            Some(page.title.clone())
        } else {
            None
        };
        let count = self.count.unwrap_or(self.pages.len());

        match title {
            Some(title) => {
                let page = self
                    .pages
                    .iter()
                    .find(|p| p.title == title)
                    .ok_or_else(|| Self::error(raw))?;
                if self.fail_titles.contains(&title) {
                    return Err(Self::error(raw));
                }
                Ok(serde_json::to_vec(&json!({
                    "id": page.id,
                    "title": page.title,
                    "lines": [{"text": page.title}],
                }))
                .unwrap())
            }
            None => {
                let skip = get("skip").unwrap_or(0);
                let limit = get("limit").unwrap_or(100);
                if self.fail_index_skip == Some(skip) && query.iter().any(|(k, _)| k == "skip") {
                    return Err(Self::error(raw));
                }
                if self.malformed_index && skip > 0 {
                    return Ok(b"{\"projectName\": ".to_vec());
                }
                let end = (skip + limit).min(self.pages.len());
                let slice = if skip < end { &self.pages[skip..end] } else { &[][..] };
                Ok(serde_json::to_vec(&json!({
                    "projectName": self.name,
                    "skip": skip,
                    "limit": limit,
                    "count": count,
                    "pages": slice,
                }))
                .unwrap())
            }
        }
    }
}

/// Context over `api` with `work_dir` and the given page limit / multiplicity.
pub(crate) fn context(
    api: Arc<MockApi>,
    work_dir: &Path,
    page_limit: usize,
    multiplicity: usize,
) -> FetchContext {
    let config = FetchConfig {
        base_url: BASE.to_string(),
        page_limit,
        multiplicity,
        work_dir: work_dir.to_path_buf(),
        ..FetchConfig::default()
    };
    FetchContext::new(config, api).unwrap()
}
