use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::fetcher::{Fetcher, PROBE_BODY_LIMIT};

/// Per-candidate bound, independent of any run-level cancellation.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(6);

const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version";

/// Answers "is this URL probably a feed" with one short, bounded fetch.
#[derive(Clone)]
pub struct Prober {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    timeout: Duration,
}

impl Prober {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_timeout(fetcher, PROBE_TIMEOUT)
    }

    pub fn with_timeout(fetcher: Arc<dyn Fetcher + Send + Sync>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Fetch failures and timeouts count as "not a feed", never as errors.
    pub async fn probe(&self, url: &str) -> bool {
        let fetch = self.fetcher.fetch(url, PROBE_BODY_LIMIT);
        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(response)) => looks_like_feed(response.content_type.as_deref(), &response.body),
            Ok(Err(e)) => {
                debug!(%url, error = %e, "Probe failed");
                false
            }
            Err(_) => {
                debug!(%url, "Probe timed out");
                false
            }
        }
    }
}

/// Classify a response by content type, sniffing the body prefix when the
/// type is missing or uninformative.
pub fn looks_like_feed(content_type: Option<&str>, head: &[u8]) -> bool {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    if ["rss", "atom", "xml"].iter().any(|t| content_type.contains(t)) {
        return true;
    }

    let head = String::from_utf8_lossy(head).to_lowercase();

    // Plain JSON is only a feed if it carries the JSON Feed signature; the
    // version URL contains the token.
    if content_type.contains("json") {
        return head.contains("jsonfeed");
    }

    ["<rss", "<feed", "<rdf", JSON_FEED_VERSION]
        .iter()
        .any(|marker| head.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetcherOptions, HttpFetcher};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_feed_content_types() {
        assert!(looks_like_feed(Some("application/rss+xml"), b""));
        assert!(looks_like_feed(Some("application/atom+xml; charset=utf-8"), b""));
        assert!(looks_like_feed(Some("text/xml"), b""));
        assert!(looks_like_feed(Some("Application/XML"), b""));
    }

    #[test]
    fn test_json_requires_feed_signature() {
        let feed = br#"{"version":"https://jsonfeed.org/version/1.1","items":[]}"#;
        assert!(looks_like_feed(Some("application/feed+json"), feed));
        assert!(looks_like_feed(Some("application/json"), b"{\"jsonfeed\":1}"));
        assert!(!looks_like_feed(Some("application/json"), br#"{"posts":[]}"#));
    }

    #[test]
    fn test_sniffs_body_without_content_type() {
        assert!(looks_like_feed(None, b"<?xml version=\"1.0\"?><RSS version=\"2.0\">"));
        assert!(looks_like_feed(Some("text/plain"), b"<feed xmlns=\"http://www.w3.org/2005/Atom\">"));
        assert!(looks_like_feed(None, b"<rdf:RDF>"));
        assert!(looks_like_feed(
            Some("application/octet-stream"),
            br#"{"version": "https://jsonfeed.org/version/1"}"#
        ));
    }

    #[test]
    fn test_html_is_not_a_feed() {
        assert!(!looks_like_feed(
            Some("text/html; charset=utf-8"),
            b"<!doctype html><html><head><title>blog</title></head></html>"
        ));
        assert!(!looks_like_feed(None, b""));
    }

    fn prober(timeout: Duration) -> Prober {
        let fetcher = HttpFetcher::new(FetcherOptions::default()).unwrap();
        Prober::with_timeout(Arc::new(fetcher), timeout)
    }

    #[tokio::test]
    async fn test_probe_accepts_feed_and_rejects_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/rss+xml")
                    .set_body_bytes("<rss></rss>"),
            )
            .mount(&server)
            .await;

        let prober = prober(PROBE_TIMEOUT);
        assert!(prober.probe(&format!("{}/rss.xml", server.uri())).await);
        assert!(!prober.probe(&format!("{}/atom.xml", server.uri())).await);
    }

    #[tokio::test]
    async fn test_probe_timeout_is_not_a_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/rss+xml")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        assert!(!prober(Duration::from_millis(50)).probe(&server.uri()).await);
    }
}
