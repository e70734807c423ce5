//! Everything a pipeline stage needs, built once per run and shared by workers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FetchConfig;
use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::transport::{CurlTransport, Transport};

#[derive(Clone)]
pub struct FetchContext {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) endpoint: Endpoint,
    pub(crate) config: FetchConfig,
}

impl FetchContext {
    /// Validates `config` and pairs it with `transport`.
    pub fn new(config: FetchConfig, transport: Arc<dyn Transport>) -> Result<Self, FetchError> {
        config.validate()?;
        let endpoint = Endpoint::new(&config.base_url)?;
        Ok(Self {
            transport,
            endpoint,
            config,
        })
    }

    /// Context backed by libcurl with the configured timeouts.
    pub fn with_curl(config: FetchConfig) -> Result<Self, FetchError> {
        let transport = Arc::new(CurlTransport::from_config(&config));
        Self::new(config, transport)
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.config.project_dir(project)
    }

    pub(crate) fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.transport.get(url)
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
