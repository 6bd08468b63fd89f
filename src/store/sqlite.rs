use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use rusqlite_migration::{Migrations, M};
use tracing::debug;

use crate::app::{AppError, Result};
use crate::domain::{Friend, Post};
use crate::store::Sink;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            AppError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| AppError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    /// Fixed-width UTC form, so string order in SQL is time order.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    fn friend_from_row(row: &Row<'_>) -> rusqlite::Result<Friend> {
        Ok(Friend {
            link: row.get(0)?,
            name: row.get(1)?,
            avatar: row.get(2)?,
            error: row.get(3)?,
            created_at: row
                .get::<_, String>(4)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }

    fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            link: row.get(0)?,
            title: row.get(1)?,
            created: row
                .get::<_, Option<String>>(2)?
                .and_then(|s| Self::parse_datetime(&s)),
            updated: row
                .get::<_, Option<String>>(3)?
                .and_then(|s| Self::parse_datetime(&s)),
            author: row.get(4)?,
            avatar: row.get(5)?,
            rule: row.get(6)?,
            created_at: row
                .get::<_, String>(7)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }

    pub fn list_friends(&self) -> Result<Vec<Friend>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT link, name, avatar, error, created_at
             FROM friends ORDER BY name, link",
        )?;

        let friends = stmt
            .query_map([], Self::friend_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(friends)
    }

    /// Posts newest first, undated last. `limit` of `None` returns all.
    pub fn list_posts(&self, limit: Option<usize>) -> Result<Vec<Post>> {
        let conn = self.conn()?;
        let limit = limit.map_or(-1, |n| n as i64);
        let mut stmt = conn.prepare(
            "SELECT link, title, created, updated, author, avatar, rule, created_at
             FROM posts ORDER BY created IS NULL, created DESC, link LIMIT ?1",
        )?;

        let posts = stmt
            .query_map(params![limit], Self::post_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    pub fn count_posts(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete posts created before `cutoff`, and posts with no creation time.
    pub fn clean_posts_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM posts WHERE created IS NULL OR created < ?1",
            params![Self::format_datetime(&cutoff)],
        )?;
        Ok(deleted)
    }
}

impl Sink for SqliteStore {
    fn merge_friend(&self, friend: &Friend) -> Result<()> {
        if friend.link.is_empty() {
            debug!(name = %friend.name, "Ignoring friend without link");
            return Ok(());
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO friends (link, name, avatar, error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(link) DO UPDATE SET
                name = excluded.name,
                avatar = excluded.avatar,
                error = excluded.error",
            params![
                friend.link,
                friend.name,
                friend.avatar,
                friend.error,
                Self::format_datetime(&friend.created_at)
            ],
        )?;

        Ok(())
    }

    fn merge_post(&self, post: &Post) -> Result<()> {
        if post.link.is_empty() {
            return Err(AppError::MissingLink);
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO posts (link, title, created, updated, author, avatar, rule, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(link) DO UPDATE SET
                title = excluded.title,
                created = excluded.created,
                updated = excluded.updated,
                author = excluded.author,
                avatar = excluded.avatar,
                rule = excluded.rule",
            params![
                post.link,
                post.title,
                post.created.as_ref().map(Self::format_datetime),
                post.updated.as_ref().map(Self::format_datetime),
                post.author,
                post.avatar,
                post.rule,
                Self::format_datetime(&post.created_at)
            ],
        )?;

        Ok(())
    }

    fn snapshot(&self) -> Result<(Vec<Friend>, Vec<Post>)> {
        Ok((self.list_friends()?, self.list_posts(None)?))
    }

    fn clean_expired(&self, days: u32) -> Result<usize> {
        if days == 0 {
            return Ok(0);
        }
        self.clean_posts_created_before(Utc::now() - Duration::days(i64::from(days)))
    }

    fn reset(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch("DELETE FROM posts; DELETE FROM friends;")?;
        Ok(())
    }
}
