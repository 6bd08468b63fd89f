use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Friend, Post};

/// Upper bound on posts carried by an export.
pub const MAX_EXPORT_POSTS: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub friends_total: usize,
    pub friends_alive: usize,
    pub friends_error: usize,
    pub posts_total: usize,
    pub updated_at: DateTime<Utc>,
}

/// Read-only projection of one sink at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stats: Stats,
    pub friends: Vec<Friend>,
    pub posts: Vec<Post>,
}

impl Snapshot {
    /// Build a snapshot from sink contents. `posts` must already be ordered
    /// newest first; only the first [`MAX_EXPORT_POSTS`] are kept and
    /// `posts_total` counts what was kept.
    pub fn new(friends: Vec<Friend>, mut posts: Vec<Post>, now: DateTime<Utc>) -> Self {
        posts.truncate(MAX_EXPORT_POSTS);

        let alive = friends.iter().filter(|f| f.is_alive()).count();
        let stats = Stats {
            friends_total: friends.len(),
            friends_alive: alive,
            friends_error: friends.len() - alive,
            posts_total: posts.len(),
            updated_at: now,
        };

        Self {
            stats,
            friends,
            posts,
        }
    }
}
