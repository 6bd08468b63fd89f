pub mod http_fetcher;

pub use http_fetcher::{FetcherOptions, HttpFetcher};

use async_trait::async_trait;

use crate::app::Result;

/// Body prefix read when probing a candidate feed URL.
pub const PROBE_BODY_LIMIT: usize = 2 * 1024;
/// Site homepage read when looking for an autodiscovery `<link>`.
pub const HTML_BODY_LIMIT: usize = 2 * 1024 * 1024;
/// Friends listing page.
pub const FRIENDS_PAGE_LIMIT: usize = 4 * 1024 * 1024;
/// Feed documents.
pub const FEED_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// A successful (2xx) response.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    pub content_type: Option<String>,
    /// Response body, truncated to the requested limit.
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Fetcher {
    /// GET `url`, reading at most `max_bytes` of the body.
    ///
    /// Transport failures and non-2xx statuses are errors; retry policy is
    /// the implementation's concern.
    async fn fetch(&self, url: &str, max_bytes: usize) -> Result<FetchResponse>;
}
