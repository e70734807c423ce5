//! Blocking HTTP GET.
//!
//! The pipeline only needs "URL in, body bytes or error out". `CurlTransport`
//! is the libcurl implementation; tests swap in their own `Transport`.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::FetchError;

/// Synchronous GET primitive shared by all workers.
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the full response body. Non-2xx is an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// One libcurl Easy handle per request. No retries.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

impl CurlTransport {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
        }
    }

    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self::new(cfg.connect_timeout(), cfg.timeout())
    }

    fn perform(&self, url: &str) -> Result<(u32, Vec<u8>), curl::Error> {
        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.useragent(concat!("sbx/", env!("CARGO_PKG_VERSION")))?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let code = easy.response_code()?;
        Ok((code, body))
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let (code, body) = self.perform(url).map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: code,
            });
        }
        tracing::trace!(url, bytes = body.len(), "GET ok");
        Ok(body)
    }
}
