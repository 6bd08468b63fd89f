//! # Friend Circle
//!
//! Aggregates recent posts from a circle of friends' blogs.
//!
//! ## Architecture
//!
//! ```text
//! Config → Roster → Discovery → Fetcher → Normalizer → Sink → Export
//! ```
//!
//! - [`aggregate`]: roster assembly and the bounded per-friend fan-out
//! - [`discovery`]: feed URL guessing, probing and `<link>` autodiscovery
//! - [`friends`]: extraction expressions and the friends-page extractor
//! - [`store`]: SQLite and in-memory sinks
//!
//! ## Quick Start
//!
//! ```bash
//! # Aggregate every friend in settings.yaml
//! friend-circle run
//!
//! # Show who the friends pages list
//! friend-circle discover
//!
//! # Find one site's feed
//! friend-circle find https://blog.example --suffix /atom.xml
//!
//! # Write the stored posts to data.json
//! friend-circle export
//! ```

/// Application context, errors and run cancellation.
///
/// [`AppContext`](app::AppContext) wires config, rules, fetcher, discovery,
/// normalizer and sink together.
pub mod app;

/// Settings (`settings.yaml`) and theme presets (`rules.yaml`).
pub mod config;

/// Command-line interface using clap.
///
/// - `run` - aggregate every friend (default)
/// - `discover` - list friends found on friends pages
/// - `export` - write the stored snapshot as JSON
/// - `find <site>` - discover one site's feed
pub mod cli;

/// Core domain models.
///
/// - [`FriendLink`](domain::FriendLink): a roster entry
/// - [`Friend`](domain::Friend): a friend as stored, with its last error
/// - [`Post`](domain::Post): one article, keyed by link
/// - [`Snapshot`](domain::Snapshot): the export view
pub mod domain;

/// HTTP fetching with bounded body reads.
pub mod fetcher;

/// Feed URL discovery.
pub mod discovery;

/// Friends-page extraction.
pub mod friends;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0 into
/// [`FeedEntry`](normalizer::FeedEntry) values.
pub mod normalizer;

/// Aggregation runs.
pub mod aggregate;

/// Sinks for friends and posts.
///
/// - [`Sink`](store::Sink): the write contract shared by both backends
/// - [`SqliteStore`](store::SqliteStore): persistent store
/// - [`MemoryStore`](store::MemoryStore): single-run buffer
pub mod store;

/// JSON snapshot export.
pub mod export;

/// tracing-subscriber setup.
pub mod logging;
