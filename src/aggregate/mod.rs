//! One aggregation run.
//!
//! ```text
//! roster (static + page sources) → one task per friend, bounded by a semaphore
//!     → discover feed → merge friend → fetch + normalize feed → merge posts
//! → retention cleanup
//! ```
//!
//! Failures are isolated per friend: they are logged, recorded on the
//! friend where they come from discovery, and never fail the run.

pub mod roster;

pub use roster::Roster;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::app::{AppError, Result, Shutdown};
use crate::config::{Config, DEFAULT_FETCH_CONCURRENCY};
use crate::discovery::FeedDiscovery;
use crate::domain::{Friend, FriendLink, Post};
use crate::fetcher::{Fetcher, FEED_BODY_LIMIT};
use crate::normalizer::{FeedEntry, Normalizer};
use crate::store::Sink;

/// Bound on retrieving one feed document.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(25);

/// Counters for one finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub friends: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub posts: usize,
    pub expired: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done { posts: usize },
    Failed,
    Cancelled,
}

/// Everything a per-friend task needs. Cheap to clone.
#[derive(Clone)]
struct Worker {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    discovery: FeedDiscovery,
    normalizer: Normalizer,
    sink: Arc<dyn Sink>,
    max_posts: usize,
}

pub struct Aggregator {
    worker: Worker,
    semaphore: Arc<Semaphore>,
    retention_days: u32,
}

impl Aggregator {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        discovery: FeedDiscovery,
        normalizer: Normalizer,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            worker: Worker {
                fetcher,
                discovery,
                normalizer,
                sink,
                max_posts: 0,
            },
            semaphore: Arc::new(Semaphore::new(DEFAULT_FETCH_CONCURRENCY)),
            retention_days: 0,
        }
    }

    /// Apply concurrency, per-feed cap and retention from `config`.
    pub fn configure(self, config: &Config) -> Self {
        self.with_concurrency(config.fetch_concurrency())
            .with_max_posts(config.max_posts())
            .with_retention_days(config.retention_days())
    }

    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(workers.max(1)));
        self
    }

    /// Posts taken from each feed; `0` means all.
    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.worker.max_posts = max_posts;
        self
    }

    /// Retention window for post cleanup; `0` disables it.
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Process every friend in `roster`, then expire old posts.
    ///
    /// Returns [`AppError::Cancelled`] if `shutdown` fires before all tasks
    /// finish; per-friend failures are reported in the [`RunReport`] only.
    pub async fn run(&self, roster: Vec<FriendLink>, shutdown: Shutdown) -> Result<RunReport> {
        let mut report = RunReport {
            friends: roster.len(),
            ..Default::default()
        };
        info!(count = roster.len(), "Aggregating friends");

        let mut handles = Vec::with_capacity(roster.len());

        for entry in roster {
            let worker = self.worker.clone();
            let semaphore = self.semaphore.clone();
            let mut shutdown = shutdown.clone();

            let handle = tokio::spawn(async move {
                tokio::select! {
                    _ = shutdown.cancelled() => Outcome::Cancelled,
                    outcome = async {
                        let Ok(_permit) = semaphore.acquire_owned().await else {
                            return Outcome::Cancelled;
                        };
                        worker.process(&entry).await
                    } => outcome,
                }
            });

            handles.push(handle);
        }

        let mut cancelled = false;
        for joined in join_all(handles).await {
            match joined {
                Ok(Outcome::Done { posts }) => {
                    report.succeeded += 1;
                    report.posts += posts;
                }
                Ok(Outcome::Failed) => report.failed += 1,
                Ok(Outcome::Cancelled) => cancelled = true,
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    report.failed += 1;
                }
            }
        }

        if cancelled {
            warn!(
                finished = report.succeeded + report.failed,
                total = report.friends,
                "Run cancelled"
            );
            return Err(AppError::Cancelled);
        }

        if self.retention_days > 0 {
            match self.worker.sink.clean_expired(self.retention_days) {
                Ok(expired) => {
                    report.expired = expired;
                    info!(count = expired, days = self.retention_days, "Removed expired posts");
                }
                Err(e) => warn!(error = %e, "Failed to clean expired posts"),
            }
        }

        info!(
            friends = report.friends,
            succeeded = report.succeeded,
            failed = report.failed,
            posts = report.posts,
            "Aggregation finished"
        );

        Ok(report)
    }
}

impl Worker {
    async fn process(&self, entry: &FriendLink) -> Outcome {
        let host = host_of(&entry.link);
        let mut friend = Friend::new(entry);

        let feed_url = match self.discovery.discover(&entry.link, &entry.feed_suffix).await {
            Ok(url) => url,
            Err(e) => {
                friend.error = Some(e.to_string());
                if let Err(e) = self.sink.merge_friend(&friend) {
                    warn!(friend = %friend.display_name(), %host, error = %e, "Failed to save friend");
                }
                warn!(friend = %friend.display_name(), %host, error = %e, "Feed discovery failed");
                return Outcome::Failed;
            }
        };

        if let Err(e) = self.sink.merge_friend(&friend) {
            warn!(friend = %friend.display_name(), %host, error = %e, "Failed to save friend");
        }
        debug!(friend = %friend.display_name(), feed = %feed_url, "Feed discovered");

        let entries = match self.read_feed(&feed_url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(friend = %friend.display_name(), %host, feed = %feed_url, error = %e, "Failed to read feed");
                return Outcome::Failed;
            }
        };

        let mut saved = 0;
        for entry in entries {
            let post = Post::from_entry(entry, &friend.avatar);
            match self.sink.merge_post(&post) {
                Ok(()) => saved += 1,
                Err(e) => {
                    warn!(friend = %friend.display_name(), %host, title = %post.display_title(), error = %e, "Failed to save post")
                }
            }
        }

        info!(friend = %friend.display_name(), count = saved, "Saved posts");
        Outcome::Done { posts: saved }
    }

    async fn read_feed(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let response = tokio::time::timeout(FEED_TIMEOUT, self.fetcher.fetch(feed_url, FEED_BODY_LIMIT))
            .await
            .map_err(|_| AppError::Timeout(feed_url.to_string()))??;

        self.normalizer.normalize(&response.body, self.max_posts)
    }
}

fn host_of(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| link.to_string())
}
