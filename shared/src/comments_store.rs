//! Persisted comment records and the moderation gate.
//!
//! Two parallel comment families exist (video comments and blog
//! comments). They are identical in shape and behavior and differ
//! only in the table they live in and the entity they hang off, so a
//! single store serves both, parameterized by [`CommentFamily`].

use anyhow::{bail, Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vote::VoteCounts;

/// Which comment family a store operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFamily {
    /// Comments attached to videos.
    Video,
    /// Comments attached to blog posts.
    Blog,
}

impl CommentFamily {
    /// Wire discriminator used by the admin routes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Blog => "blog",
        }
    }

    /// Parses the wire discriminator.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "video" => Some(Self::Video),
            "blog" => Some(Self::Blog),
            _ => None,
        }
    }

    fn table(self) -> &'static str {
        match self {
            Self::Video => "video_comments",
            Self::Blog => "blog_comments",
        }
    }
}

/// Moderation state of a comment.
///
/// Public submissions are created `approved`; only approved comments
/// are visible to the public listing and the tree builder. `pending`
/// is reserved for a review workflow that holds submissions back
/// before publication — no in-repo path creates it today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    /// Publicly visible.
    Approved,
    /// Hidden by a moderator.
    Blocked,
    /// Awaiting review; not publicly visible.
    Pending,
}

impl CommentStatus {
    /// Storage spelling of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Blocked => "blocked",
            Self::Pending => "pending",
        }
    }

    /// Parses the storage spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "approved" => Some(Self::Approved),
            "blocked" => Some(Self::Blocked),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Whether the gate permits moving from `self` to `next`.
    ///
    /// Pending comments may be approved or blocked, approved ones
    /// blocked, and blocked ones re-approved. Nothing transitions
    /// back to pending. A same-state transition is always permitted
    /// and treated as a no-op by [`CommentStore::set_status`].
    pub fn can_become(self, next: CommentStatus) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Blocked)
                | (Self::Approved, Self::Blocked)
                | (Self::Blocked, Self::Approved)
        )
    }
}

/// A stored comment. Comments are never edited after creation; only
/// their status changes, their counters move, or the record is
/// deleted outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique id, assigned at creation.
    pub id: String,
    /// Owning video or blog id. Immutable.
    pub parent_entity_id: String,
    /// Optional reply target within the same family.
    pub parent_comment_id: Option<String>,
    /// Display name of the author.
    pub author_name: String,
    /// Sanitized message body.
    pub message: String,
    /// Like counter, never negative.
    pub likes: i64,
    /// Dislike counter, never negative.
    pub dislikes: i64,
    /// Moderation state.
    pub status: CommentStatus,
    /// Creation timestamp, milliseconds since the epoch.
    pub created_at: i64,
}

/// Input for creating a comment. Text fields are expected to be
/// sanitized and length-checked by the caller.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Owning video or blog id.
    pub parent_entity_id: String,
    /// Reply target, if this is a nested reply.
    pub parent_comment_id: Option<String>,
    /// Display name of the author.
    pub author_name: String,
    /// Message body.
    pub message: String,
}

/// SQLite-backed store for both comment families.
pub struct CommentStore {
    conn: Mutex<Connection>,
}

impl CommentStore {
    /// Opens (and migrates) the comment database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open comment database at {path}"))?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Creates a comment in the default `approved` state. The public
    /// submission path has no pre-publish review.
    pub fn create(&self, family: CommentFamily, input: NewComment) -> Result<Comment> {
        self.create_with_status(family, input, CommentStatus::Approved)
    }

    /// Creates a comment in an explicit state. Exists for moderation
    /// workflows that hold submissions back as `pending`.
    pub fn create_with_status(
        &self,
        family: CommentFamily,
        input: NewComment,
        status: CommentStatus,
    ) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            parent_entity_id: input.parent_entity_id,
            parent_comment_id: input.parent_comment_id,
            author_name: input.author_name,
            message: input.message,
            likes: 0,
            dislikes: 0,
            status,
            created_at: now_ms(),
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, parent_entity_id, parent_comment_id, author_name, message, \
                 likes, dislikes, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                family.table()
            ),
            params![
                comment.id,
                comment.parent_entity_id,
                comment.parent_comment_id,
                comment.author_name,
                comment.message,
                comment.likes,
                comment.dislikes,
                comment.status.as_str(),
                comment.created_at,
            ],
        )
        .context("failed to insert comment")?;
        Ok(comment)
    }

    /// Fetches one comment by id.
    pub fn get(&self, family: CommentFamily, id: &str) -> Result<Option<Comment>> {
        let conn = self.conn.lock();
        fetch_comment(&conn, family, id)
    }

    /// Approved comments for one entity, creation order ascending.
    /// This is the tree builder's input; blocked and pending comments
    /// are excluded entirely, so their replies surface as orphans.
    pub fn list_approved(&self, family: CommentFamily, entity_id: &str) -> Result<Vec<Comment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, parent_entity_id, parent_comment_id, author_name, message, likes, \
             dislikes, status, created_at FROM {} WHERE parent_entity_id = ?1 \
             AND status = 'approved' ORDER BY created_at ASC, rowid ASC",
            family.table()
        ))?;
        let rows = stmt
            .query_map(params![entity_id], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list approved comments")?;
        Ok(rows)
    }

    /// All comments for one entity regardless of status, newest
    /// first. Used by the admin moderation screen.
    pub fn list_for_entity(
        &self,
        family: CommentFamily,
        entity_id: &str,
        limit: usize,
    ) -> Result<Vec<Comment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, parent_entity_id, parent_comment_id, author_name, message, likes, \
             dislikes, status, created_at FROM {} WHERE parent_entity_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            family.table()
        ))?;
        let rows = stmt
            .query_map(params![entity_id, limit.max(1) as i64], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list comments for entity")?;
        Ok(rows)
    }

    /// Most recent comments across a whole family regardless of
    /// status. The admin moderation queue without an entity filter.
    pub fn list_recent(&self, family: CommentFamily, limit: usize) -> Result<Vec<Comment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, parent_entity_id, parent_comment_id, author_name, message, likes, \
             dislikes, status, created_at FROM {} \
             ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            family.table()
        ))?;
        let rows = stmt
            .query_map(params![limit.max(1) as i64], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list recent comments")?;
        Ok(rows)
    }

    /// Total comment count for a family.
    pub fn count(&self, family: CommentFamily) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", family.table()), [], |row| row.get(0))
            .context("failed to count comments")?;
        Ok(count)
    }

    /// Comment count for a family in one status.
    pub fn count_by_status(&self, family: CommentFamily, status: CommentStatus) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE status = ?1", family.table()),
                params![status.as_str()],
                |row| row.get(0),
            )
            .context("failed to count comments by status")?;
        Ok(count)
    }

    /// Moves a comment through the moderation gate.
    ///
    /// Returns `None` when the comment does not exist. A same-state
    /// transition returns the unchanged record without touching the
    /// store. A transition the gate forbids is an error.
    pub fn set_status(
        &self,
        family: CommentFamily,
        id: &str,
        next: CommentStatus,
    ) -> Result<Option<Comment>> {
        let conn = self.conn.lock();
        let Some(current) = fetch_comment(&conn, family, id)? else {
            return Ok(None);
        };
        if current.status == next {
            return Ok(Some(current));
        }
        if !current.status.can_become(next) {
            bail!(
                "invalid comment status transition: {} -> {}",
                current.status.as_str(),
                next.as_str()
            );
        }

        conn.execute(
            &format!("UPDATE {} SET status = ?1 WHERE id = ?2", family.table()),
            params![next.as_str(), id],
        )
        .context("failed to update comment status")?;
        tracing::info!(
            comment_id = %id,
            family = family.as_str(),
            from = current.status.as_str(),
            to = next.as_str(),
            "Comment status changed"
        );
        Ok(Some(Comment { status: next, ..current }))
    }

    /// Writes a comment's counter pair.
    pub fn update_votes(&self, family: CommentFamily, id: &str, counts: VoteCounts) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                &format!("UPDATE {} SET likes = ?1, dislikes = ?2 WHERE id = ?3", family.table()),
                params![counts.likes, counts.dislikes, id],
            )
            .context("failed to update comment votes")?;
        if changed == 0 {
            bail!("comment {id} vanished during vote update");
        }
        Ok(())
    }

    /// Deletes one comment outright. Replies keep their records and
    /// are promoted to top level by the tree builder. Returns whether
    /// a record was actually removed.
    pub fn delete(&self, family: CommentFamily, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", family.table()), params![id])
            .context("failed to delete comment")?;
        Ok(deleted > 0)
    }

    /// Deletes every comment attached to an entity. Runs when the
    /// owning video or blog is deleted.
    pub fn delete_for_entity(&self, family: CommentFamily, entity_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                &format!("DELETE FROM {} WHERE parent_entity_id = ?1", family.table()),
                params![entity_id],
            )
            .context("failed to delete comments for entity")?;
        if deleted > 0 {
            tracing::info!(
                entity_id = %entity_id,
                family = family.as_str(),
                count = deleted,
                "Cascade-deleted comments"
            );
        }
        Ok(deleted)
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn init_schema(conn: &Connection) -> Result<()> {
    for family in [CommentFamily::Video, CommentFamily::Blog] {
        let table = family.table();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                parent_entity_id TEXT NOT NULL,
                parent_comment_id TEXT,
                author_name TEXT NOT NULL,
                message TEXT NOT NULL,
                likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
                dislikes INTEGER NOT NULL DEFAULT 0 CHECK (dislikes >= 0),
                status TEXT NOT NULL DEFAULT 'approved',
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_entity
                ON {table} (parent_entity_id, status, created_at);"
        ))
        .with_context(|| format!("failed to create table {table}"))?;
    }
    Ok(())
}

fn fetch_comment(conn: &Connection, family: CommentFamily, id: &str) -> Result<Option<Comment>> {
    let comment = conn
        .query_row(
            &format!(
                "SELECT id, parent_entity_id, parent_comment_id, author_name, message, likes, \
                 dislikes, status, created_at FROM {} WHERE id = ?1",
                family.table()
            ),
            params![id],
            comment_from_row,
        )
        .optional()
        .context("failed to fetch comment")?;
    Ok(comment)
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    let status_raw: String = row.get("status")?;
    let status = CommentStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("unknown comment status: {status_raw}").into(),
        )
    })?;
    Ok(Comment {
        id: row.get("id")?,
        parent_entity_id: row.get("parent_entity_id")?,
        parent_comment_id: row.get("parent_comment_id")?,
        author_name: row.get("author_name")?,
        message: row.get("message")?,
        likes: row.get("likes")?,
        dislikes: row.get("dislikes")?,
        status,
        created_at: row.get("created_at")?,
    })
}
