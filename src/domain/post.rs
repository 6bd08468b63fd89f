use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalizer::FeedEntry;

/// Origin tag for posts read from a syndication feed.
pub const FEED_RULE: &str = "feed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub link: String,
    pub author: String,
    pub avatar: String,
    pub rule: String,
    /// First time this link was ingested. Stores keep the original value on
    /// repeat merges.
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn from_entry(entry: FeedEntry, avatar: &str) -> Self {
        Self {
            title: entry.title,
            created: entry.created,
            updated: entry.updated,
            link: entry.link,
            author: entry.author,
            avatar: avatar.to_string(),
            rule: FEED_RULE.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}
