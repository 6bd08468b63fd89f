use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::app::{AppError, Result};
use crate::domain::{Friend, Post};
use crate::store::Sink;

#[derive(Default)]
struct Tables {
    friends: HashMap<String, Friend>,
    posts: HashMap<String, Post>,
}

/// In-process sink holding the results of a single run.
///
/// One lock covers both tables; it is held for one call at a time and never
/// across network I/O.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| AppError::LockPoisoned(e.to_string()))
    }
}

impl Sink for MemoryStore {
    fn merge_friend(&self, friend: &Friend) -> Result<()> {
        if friend.link.is_empty() {
            return Ok(());
        }

        let mut tables = self.tables()?;
        match tables.friends.get_mut(&friend.link) {
            Some(existing) => {
                existing.name = friend.name.clone();
                existing.avatar = friend.avatar.clone();
                existing.error = friend.error.clone();
            }
            None => {
                tables.friends.insert(friend.link.clone(), friend.clone());
            }
        }
        Ok(())
    }

    fn merge_post(&self, post: &Post) -> Result<()> {
        if post.link.is_empty() {
            return Err(AppError::MissingLink);
        }

        let mut tables = self.tables()?;
        let created_at = tables
            .posts
            .get(&post.link)
            .map_or(post.created_at, |existing| existing.created_at);

        let mut post = post.clone();
        post.created_at = created_at;
        tables.posts.insert(post.link.clone(), post);
        Ok(())
    }

    fn snapshot(&self) -> Result<(Vec<Friend>, Vec<Post>)> {
        let tables = self.tables()?;

        let mut friends: Vec<Friend> = tables.friends.values().cloned().collect();
        friends.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.link.cmp(&b.link)));

        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        // None sorts below any Some, so reversing puts undated posts last.
        posts.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.link.cmp(&b.link)));

        Ok((friends, posts))
    }

    /// The buffer only ever holds one run, so there is nothing to expire.
    fn clean_expired(&self, _days: u32) -> Result<usize> {
        Ok(0)
    }

    fn reset(&self) -> Result<()> {
        let mut tables = self.tables()?;
        tables.friends.clear();
        tables.posts.clear();
        Ok(())
    }
}
