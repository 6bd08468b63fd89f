use std::sync::Arc;

use crate::aggregate::{roster, Aggregator, Roster};
use crate::app::Result;
use crate::config::{Config, Rules};
use crate::discovery::FeedDiscovery;
use crate::fetcher::http_fetcher::{FetcherOptions, HttpFetcher};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::store::{MemoryStore, Sink, SqliteStore};

pub struct AppContext {
    pub config: Config,
    pub rules: Rules,
    pub sink: Arc<dyn Sink>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub discovery: FeedDiscovery,
    pub normalizer: Normalizer,
}

impl AppContext {
    /// Wire the components for `config`: the in-memory sink in simple mode,
    /// otherwise the SQLite database at `DATABASE.dsn`.
    pub fn new(config: Config, rules: Rules) -> Result<Self> {
        let sink: Arc<dyn Sink> = if config.simple_mode {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(SqliteStore::new(&config.database.dsn)?)
        };
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(FetcherOptions::from_config(&config))?);

        Ok(Self::with_parts(config, rules, fetcher, sink))
    }

    pub fn with_parts(
        config: Config,
        rules: Rules,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        let discovery = FeedDiscovery::new(fetcher.clone());

        Self {
            config,
            rules,
            sink,
            fetcher,
            discovery,
            normalizer: Normalizer::new(),
        }
    }

    /// Static friends plus every configured friends page.
    pub async fn roster(&self) -> Roster {
        roster::assemble(self.fetcher.as_ref(), &self.config, &self.rules).await
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(
            self.fetcher.clone(),
            self.discovery.clone(),
            self.normalizer.clone(),
            self.sink.clone(),
        )
        .configure(&self.config)
    }
}
