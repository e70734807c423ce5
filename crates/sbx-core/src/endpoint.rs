//! URL construction for the index and detail endpoints.
//!
//! Project names and page titles go in as single path segments, so `/`, `?`,
//! `#`, spaces and non-ASCII are percent-encoded (`a/b` → `a%2Fb`).

use url::Url;

use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url)
            .map_err(|e| FetchError::Config(format!("base_url {:?}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Config(format!(
                "base_url {:?} cannot be a base URL",
                base_url
            )));
        }
        Ok(Self { base })
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for seg in segments {
                path.push(seg);
            }
        }
        url
    }

    /// `<base>/<project>?limit=1`: just enough to learn `count` and the canonical name.
    pub fn summary(&self, project: &str) -> String {
        let mut url = self.with_segments(&[project]);
        url.query_pairs_mut().append_pair("limit", "1");
        url.into()
    }

    /// `<base>/<project>?skip=<skip>&limit=<limit>&sort=updated`.
    pub fn index_page(&self, project: &str, skip: usize, limit: usize) -> String {
        let mut url = self.with_segments(&[project]);
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string())
            .append_pair("sort", "updated");
        url.into()
    }

    /// `<base>/<project>/<title>` with the title percent-encoded.
    pub fn detail(&self, project: &str, title: &str) -> String {
        self.with_segments(&[project, title]).into()
    }
}
