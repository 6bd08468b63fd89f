//! Feed discovery for a friend's site.
//!
//! Candidates are probed strictly in order, one request at a time:
//!
//! ```text
//! suffix hint (root + dir) → dir-relative filenames → root endpoints → <link> in homepage HTML
//! ```
//!
//! The first candidate that probes as a feed wins.

pub mod probe;
pub mod resolve;

pub use probe::{looks_like_feed, Prober, PROBE_TIMEOUT};
pub use resolve::{resolve_dir, resolve_link, resolve_root};

use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::debug;

use crate::app::{AppError, Result};
use crate::fetcher::{Fetcher, HTML_BODY_LIMIT};

/// Filenames tried relative to the site URL treated as a directory, so
/// sites hosted under a sub-path are covered.
const DIR_CANDIDATES: &[&str] = &["index.xml", "atom.xml", "rss.xml", "feed", "feed.xml"];

/// Endpoints tried relative to the site root.
const ROOT_CANDIDATES: &[&str] = &[
    "/feed",
    "/feed/",
    "/feed.xml",
    "/index.xml",
    "/atom.xml",
    "/rss.xml",
    "/rss2.xml",
    "/rss.php",
    "/feed.php",
    "/rss",
    "/atom",
    "/index.rss",
    "/index.atom",
    // WordPress query form
    "/?feed=rss2",
    "/?feed=atom",
    "/?feed=rss",
    "/feed/atom",
    "/posts/index.xml",
    "/blog/index.xml",
    "/index.json",
    "/feed.json",
    "/api/rss",
];

const FEED_EXTENSIONS: &[&str] = &[".xml", ".rss", ".atom", ".json"];

#[derive(Clone)]
pub struct FeedDiscovery {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    prober: Prober,
}

impl FeedDiscovery {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let prober = Prober::new(fetcher.clone());
        Self { fetcher, prober }
    }

    /// Find the feed URL for `site`. `feed_suffix` may be empty.
    pub async fn discover(&self, site: &str, feed_suffix: &str) -> Result<String> {
        for candidate in candidates(site, feed_suffix) {
            debug!(%site, %candidate, "Probing feed candidate");
            if self.prober.probe(&candidate).await {
                return Ok(candidate);
            }
        }

        match self.from_html(site).await {
            Some(found) if self.prober.probe(&found).await => {
                debug!(%site, feed = %found, "Feed found via <link>");
                Ok(found)
            }
            _ => Err(AppError::FeedNotFound(site.to_string())),
        }
    }

    async fn from_html(&self, site: &str) -> Option<String> {
        match self.fetcher.fetch(site, HTML_BODY_LIMIT).await {
            Ok(response) => find_feed_link(&response.text(), site),
            Err(e) => {
                debug!(%site, error = %e, "Homepage fetch failed");
                None
            }
        }
    }
}

/// The ordered candidate list for `site`.
pub fn candidates(site: &str, feed_suffix: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(2 + DIR_CANDIDATES.len() + ROOT_CANDIDATES.len());

    let feed_suffix = feed_suffix.trim();
    if !feed_suffix.is_empty() {
        out.push(resolve_root(site, feed_suffix));
        out.push(resolve_dir(site, feed_suffix));
    }
    out.extend(DIR_CANDIDATES.iter().map(|c| resolve_dir(site, c)));
    out.extend(ROOT_CANDIDATES.iter().map(|c| resolve_root(site, c)));

    out
}

/// Pick a feed URL from a page's `<link>` elements.
///
/// A `rel="alternate"` link with an RSS, Atom or JSON type is preferred; a
/// link with no type whose href has a feed-like extension is accepted
/// otherwise.
pub fn find_feed_link(html: &str, site: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("link[href]").ok()?;

    let links: Vec<(String, String, &str)> = document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let rel = el.value().attr("rel").unwrap_or_default().to_ascii_lowercase();
            let kind = el.value().attr("type").unwrap_or_default().trim().to_ascii_lowercase();
            Some((rel, kind, href))
        })
        .collect();

    let alternate = links.iter().find(|(rel, kind, _)| {
        rel.contains("alternate") && ["rss", "atom", "json"].iter().any(|t| kind.contains(t))
    });

    let untyped = || {
        links.iter().find(|(_, kind, href)| {
            let href = href.to_ascii_lowercase();
            kind.is_empty() && FEED_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
        })
    };

    alternate
        .or_else(untyped)
        .map(|(_, _, href)| resolve_root(site, href))
}
