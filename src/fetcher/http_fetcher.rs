use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy, Response};
use tracing::debug;

use crate::app::{AppError, Result};
use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::fetcher::{FetchResponse, Fetcher};

/// Linear backoff step between attempts.
const RETRY_BACKOFF: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra attempts after the first one.
    pub retry: u32,
    pub proxy_http: Option<String>,
    pub proxy_https: Option<String>,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(25),
            connect_timeout: Duration::from_secs(10),
            retry: 0,
            proxy_http: None,
            proxy_https: None,
        }
    }
}

impl FetcherOptions {
    pub fn from_config(config: &Config) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            user_agent: config.effective_user_agent(),
            retry: config.retry(),
            proxy_http: non_empty(&config.proxy.http),
            proxy_https: non_empty(&config.proxy.https),
            ..Default::default()
        }
    }
}

pub struct HttpFetcher {
    client: Client,
    retry: u32,
}

impl HttpFetcher {
    pub fn new(options: FetcherOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(options.user_agent);

        if let Some(proxy) = &options.proxy_http {
            builder = builder.proxy(Proxy::http(proxy)?);
        }
        if let Some(proxy) = &options.proxy_https {
            builder = builder.proxy(Proxy::https(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            retry: options.retry,
        })
    }

    async fn attempt(&self, url: &str, max_bytes: usize) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = read_limited(response, max_bytes).await?;

        Ok(FetchResponse { content_type, body })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, max_bytes: usize) -> Result<FetchResponse> {
        let attempts = self.retry + 1;
        let mut attempt = 1;

        loop {
            match self.attempt(url, max_bytes).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    debug!(%url, attempt, error = %e, "Fetch failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Read the body chunk by chunk, stopping once `max_bytes` are buffered.
async fn read_limited(mut response: Response, max_bytes: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        let remaining = max_bytes - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
