pub mod memory;
pub mod sqlite;

use chrono::Utc;

use crate::app::Result;
use crate::domain::{Friend, Post, Snapshot};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Write target of an aggregation run.
///
/// Both merges are idempotent upserts keyed by link: the last write wins for
/// every field except the first-seen `created_at`, which the store keeps.
pub trait Sink: Send + Sync {
    /// Friends with an empty link are ignored.
    fn merge_friend(&self, friend: &Friend) -> Result<()>;

    /// Fails with [`AppError::MissingLink`](crate::app::AppError::MissingLink)
    /// when the post has no link.
    fn merge_post(&self, post: &Post) -> Result<()>;

    /// Friends ordered by name ascending, posts by creation time descending
    /// with undated posts last.
    fn snapshot(&self) -> Result<(Vec<Friend>, Vec<Post>)>;

    /// Delete posts created more than `days` days ago. `0` disables cleanup.
    /// Returns the number of posts removed.
    fn clean_expired(&self, days: u32) -> Result<usize>;

    /// Remove every friend and post.
    fn reset(&self) -> Result<()>;

    /// Export view of the current contents, capped to the export limit.
    fn export_snapshot(&self) -> Result<Snapshot> {
        let (friends, posts) = self.snapshot()?;
        Ok(Snapshot::new(friends, posts, Utc::now()))
    }
}
