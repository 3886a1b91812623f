//! Persisted content records: videos, blogs, categories and the menu
//! settings singleton.
//!
//! The store exposes only the operations the handlers need — fetch by
//! id or slug, filtered listings, field updates and deletes. Slugs
//! are derived from titles at write time and kept unique per table;
//! callers check [`ContentStore::video_slug_taken`] /
//! [`ContentStore::blog_slug_taken`] first to report duplicates as a
//! conflict instead of a storage error.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::slugify;
use crate::vote::VoteCounts;

/// A published video record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Unique id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// URL slug derived from the title, unique.
    pub slug: String,
    /// Sanitized description.
    pub description: String,
    /// YouTube video id (already extracted from any URL form).
    pub youtube_id: String,
    /// Owning category id.
    pub category_id: String,
    /// Optional uploaded thumbnail path, stored opaque.
    pub thumbnail_path: Option<String>,
    /// Like counter.
    pub likes: i64,
    /// Dislike counter.
    pub dislikes: i64,
    /// Whether public commenting is open.
    pub discussion_enabled: bool,
    /// Creation timestamp, ms.
    pub created_at: i64,
    /// Last update timestamp, ms.
    pub updated_at: i64,
}

/// A published blog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Unique id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// URL slug derived from the title, unique.
    pub slug: String,
    /// Sanitized body text.
    pub content: String,
    /// Optional owning category id.
    pub category_id: Option<String>,
    /// Optional uploaded thumbnail path, stored opaque.
    pub thumbnail_path: Option<String>,
    /// Like counter.
    pub likes: i64,
    /// Dislike counter.
    pub dislikes: i64,
    /// Whether public commenting is open.
    pub discussion_enabled: bool,
    /// Creation timestamp, ms.
    pub created_at: i64,
    /// Last update timestamp, ms.
    pub updated_at: i64,
}

/// A content category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique id.
    pub id: String,
    /// Unique display name.
    pub name: String,
    /// Creation timestamp, ms.
    pub created_at: i64,
}

/// Site navigation toggles, a single upserted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSettings {
    /// Show the videos section in the public menu.
    pub show_videos_menu: bool,
    /// Show the blogs section in the public menu.
    pub show_blogs_menu: bool,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self { show_videos_menu: true, show_blogs_menu: true }
    }
}

/// Fields accepted when creating or updating a video. Text fields are
/// sanitized and length-checked by the caller; `youtube_id` is the
/// already-extracted id.
#[derive(Debug, Clone)]
pub struct VideoInput {
    /// Display title; the slug is derived from it.
    pub title: String,
    /// Description body.
    pub description: String,
    /// Extracted YouTube id.
    pub youtube_id: String,
    /// Owning category id.
    pub category_id: String,
    /// Optional thumbnail path; `None` keeps the existing one on
    /// update.
    pub thumbnail_path: Option<String>,
    /// Whether public commenting is open.
    pub discussion_enabled: bool,
}

/// Fields accepted when creating or updating a blog.
#[derive(Debug, Clone)]
pub struct BlogInput {
    /// Display title; the slug is derived from it.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Optional owning category id.
    pub category_id: Option<String>,
    /// Optional thumbnail path; `None` keeps the existing one on
    /// update.
    pub thumbnail_path: Option<String>,
    /// Whether public commenting is open.
    pub discussion_enabled: bool,
}

/// SQLite-backed store for videos, blogs, categories and settings.
pub struct ContentStore {
    conn: Mutex<Connection>,
}

impl ContentStore {
    /// Opens (and migrates) the content database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open content database at {path}"))?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    // ---- videos ----

    /// Whether a video slug is already taken, optionally ignoring one
    /// record (the one being updated).
    pub fn video_slug_taken(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool> {
        let conn = self.conn.lock();
        slug_taken(&conn, "videos", slug, exclude_id)
    }

    /// Creates a video. The category must exist.
    pub fn create_video(&self, input: VideoInput) -> Result<Video> {
        let now = now_ms();
        let video = Video {
            id: Uuid::new_v4().to_string(),
            slug: slugify(&input.title),
            title: input.title,
            description: input.description,
            youtube_id: input.youtube_id,
            category_id: input.category_id,
            thumbnail_path: input.thumbnail_path,
            likes: 0,
            dislikes: 0,
            discussion_enabled: input.discussion_enabled,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock();
        if fetch_category(&conn, &video.category_id)?.is_none() {
            bail!("category {} does not exist", video.category_id);
        }
        conn.execute(
            "INSERT INTO videos (id, title, slug, description, youtube_id, category_id, \
             thumbnail_path, likes, dislikes, discussion_enabled, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                video.id,
                video.title,
                video.slug,
                video.description,
                video.youtube_id,
                video.category_id,
                video.thumbnail_path,
                video.likes,
                video.dislikes,
                video.discussion_enabled,
                video.created_at,
                video.updated_at,
            ],
        )
        .context("failed to insert video")?;
        tracing::info!(video_id = %video.id, slug = %video.slug, "Video created");
        Ok(video)
    }

    /// Lists videos newest first, optionally filtered by a substring
    /// search over title/description and by category.
    pub fn list_videos(&self, q: Option<&str>, category_id: Option<&str>) -> Result<Vec<Video>> {
        let conn = self.conn.lock();
        let pattern = q.map(like_pattern);
        let mut stmt = conn.prepare(
            "SELECT id, title, slug, description, youtube_id, category_id, thumbnail_path, \
             likes, dislikes, discussion_enabled, created_at, updated_at FROM videos \
             WHERE (?1 IS NULL OR title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\') \
             AND (?2 IS NULL OR category_id = ?2) \
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map(params![pattern, category_id], video_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list videos")?;
        Ok(rows)
    }

    /// Most recently added videos, for the admin dashboard.
    pub fn recent_videos(&self, limit: usize) -> Result<Vec<Video>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, slug, description, youtube_id, category_id, thumbnail_path, \
             likes, dislikes, discussion_enabled, created_at, updated_at FROM videos \
             ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit.max(1) as i64], video_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list recent videos")?;
        Ok(rows)
    }

    /// Fetches a video by id.
    pub fn get_video(&self, id: &str) -> Result<Option<Video>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, slug, description, youtube_id, category_id, thumbnail_path, \
             likes, dislikes, discussion_enabled, created_at, updated_at FROM videos \
             WHERE id = ?1",
            params![id],
            video_from_row,
        )
        .optional()
        .context("failed to fetch video")
    }

    /// Fetches a video by slug.
    pub fn get_video_by_slug(&self, slug: &str) -> Result<Option<Video>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, slug, description, youtube_id, category_id, thumbnail_path, \
             likes, dislikes, discussion_enabled, created_at, updated_at FROM videos \
             WHERE slug = ?1",
            params![slug],
            video_from_row,
        )
        .optional()
        .context("failed to fetch video by slug")
    }

    /// Rewrites a video's editable fields, recomputing the slug from
    /// the new title. A `None` thumbnail keeps the stored one.
    pub fn update_video(&self, id: &str, input: VideoInput) -> Result<Option<Video>> {
        let conn = self.conn.lock();
        let Some(mut video) = conn
            .query_row(
                "SELECT id, title, slug, description, youtube_id, category_id, thumbnail_path, \
                 likes, dislikes, discussion_enabled, created_at, updated_at FROM videos \
                 WHERE id = ?1",
                params![id],
                video_from_row,
            )
            .optional()
            .context("failed to fetch video for update")?
        else {
            return Ok(None);
        };

        if fetch_category(&conn, &input.category_id)?.is_none() {
            bail!("category {} does not exist", input.category_id);
        }

        video.slug = slugify(&input.title);
        video.title = input.title;
        video.description = input.description;
        video.youtube_id = input.youtube_id;
        video.category_id = input.category_id;
        if let Some(path) = input.thumbnail_path {
            video.thumbnail_path = Some(path);
        }
        video.discussion_enabled = input.discussion_enabled;
        video.updated_at = now_ms();

        conn.execute(
            "UPDATE videos SET title = ?1, slug = ?2, description = ?3, youtube_id = ?4, \
             category_id = ?5, thumbnail_path = ?6, discussion_enabled = ?7, updated_at = ?8 \
             WHERE id = ?9",
            params![
                video.title,
                video.slug,
                video.description,
                video.youtube_id,
                video.category_id,
                video.thumbnail_path,
                video.discussion_enabled,
                video.updated_at,
                video.id,
            ],
        )
        .context("failed to update video")?;
        Ok(Some(video))
    }

    /// Deletes a video; comment cleanup is the caller's concern.
    pub fn delete_video(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM videos WHERE id = ?1", params![id])
            .context("failed to delete video")?;
        Ok(deleted > 0)
    }

    /// Writes a video's counter pair.
    pub fn update_video_votes(&self, id: &str, counts: VoteCounts) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE videos SET likes = ?1, dislikes = ?2 WHERE id = ?3",
                params![counts.likes, counts.dislikes, id],
            )
            .context("failed to update video votes")?;
        if changed == 0 {
            bail!("video {id} vanished during vote update");
        }
        Ok(())
    }

    /// Total number of videos.
    pub fn count_videos(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))
            .context("failed to count videos")
    }

    /// Number of videos assigned to a category. Guards category
    /// deletion.
    pub fn count_videos_in_category(&self, category_id: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*) FROM videos WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )
        .context("failed to count videos in category")
    }

    // ---- blogs ----

    /// Whether a blog slug is already taken, optionally ignoring one
    /// record.
    pub fn blog_slug_taken(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool> {
        let conn = self.conn.lock();
        slug_taken(&conn, "blogs", slug, exclude_id)
    }

    /// Creates a blog post.
    pub fn create_blog(&self, input: BlogInput) -> Result<Blog> {
        let now = now_ms();
        let blog = Blog {
            id: Uuid::new_v4().to_string(),
            slug: slugify(&input.title),
            title: input.title,
            content: input.content,
            category_id: input.category_id,
            thumbnail_path: input.thumbnail_path,
            likes: 0,
            dislikes: 0,
            discussion_enabled: input.discussion_enabled,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO blogs (id, title, slug, content, category_id, thumbnail_path, likes, \
             dislikes, discussion_enabled, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                blog.id,
                blog.title,
                blog.slug,
                blog.content,
                blog.category_id,
                blog.thumbnail_path,
                blog.likes,
                blog.dislikes,
                blog.discussion_enabled,
                blog.created_at,
                blog.updated_at,
            ],
        )
        .context("failed to insert blog")?;
        tracing::info!(blog_id = %blog.id, slug = %blog.slug, "Blog created");
        Ok(blog)
    }

    /// Lists blogs newest first, optionally filtered by a substring
    /// search over title/content and by category.
    pub fn list_blogs(&self, q: Option<&str>, category_id: Option<&str>) -> Result<Vec<Blog>> {
        let conn = self.conn.lock();
        let pattern = q.map(like_pattern);
        let mut stmt = conn.prepare(
            "SELECT id, title, slug, content, category_id, thumbnail_path, likes, dislikes, \
             discussion_enabled, created_at, updated_at FROM blogs \
             WHERE (?1 IS NULL OR title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\') \
             AND (?2 IS NULL OR category_id = ?2) \
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map(params![pattern, category_id], blog_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list blogs")?;
        Ok(rows)
    }

    /// Fetches a blog by id.
    pub fn get_blog(&self, id: &str) -> Result<Option<Blog>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, slug, content, category_id, thumbnail_path, likes, dislikes, \
             discussion_enabled, created_at, updated_at FROM blogs WHERE id = ?1",
            params![id],
            blog_from_row,
        )
        .optional()
        .context("failed to fetch blog")
    }

    /// Fetches a blog by slug.
    pub fn get_blog_by_slug(&self, slug: &str) -> Result<Option<Blog>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, slug, content, category_id, thumbnail_path, likes, dislikes, \
             discussion_enabled, created_at, updated_at FROM blogs WHERE slug = ?1",
            params![slug],
            blog_from_row,
        )
        .optional()
        .context("failed to fetch blog by slug")
    }

    /// Rewrites a blog's editable fields, recomputing the slug from
    /// the new title. A `None` thumbnail keeps the stored one.
    pub fn update_blog(&self, id: &str, input: BlogInput) -> Result<Option<Blog>> {
        let conn = self.conn.lock();
        let Some(mut blog) = conn
            .query_row(
                "SELECT id, title, slug, content, category_id, thumbnail_path, likes, dislikes, \
                 discussion_enabled, created_at, updated_at FROM blogs WHERE id = ?1",
                params![id],
                blog_from_row,
            )
            .optional()
            .context("failed to fetch blog for update")?
        else {
            return Ok(None);
        };

        blog.slug = slugify(&input.title);
        blog.title = input.title;
        blog.content = input.content;
        blog.category_id = input.category_id;
        if let Some(path) = input.thumbnail_path {
            blog.thumbnail_path = Some(path);
        }
        blog.discussion_enabled = input.discussion_enabled;
        blog.updated_at = now_ms();

        conn.execute(
            "UPDATE blogs SET title = ?1, slug = ?2, content = ?3, category_id = ?4, \
             thumbnail_path = ?5, discussion_enabled = ?6, updated_at = ?7 WHERE id = ?8",
            params![
                blog.title,
                blog.slug,
                blog.content,
                blog.category_id,
                blog.thumbnail_path,
                blog.discussion_enabled,
                blog.updated_at,
                blog.id,
            ],
        )
        .context("failed to update blog")?;
        Ok(Some(blog))
    }

    /// Deletes a blog; comment cleanup is the caller's concern.
    pub fn delete_blog(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM blogs WHERE id = ?1", params![id])
            .context("failed to delete blog")?;
        Ok(deleted > 0)
    }

    /// Writes a blog's counter pair.
    pub fn update_blog_votes(&self, id: &str, counts: VoteCounts) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE blogs SET likes = ?1, dislikes = ?2 WHERE id = ?3",
                params![counts.likes, counts.dislikes, id],
            )
            .context("failed to update blog votes")?;
        if changed == 0 {
            bail!("blog {id} vanished during vote update");
        }
        Ok(())
    }

    /// Total number of blogs.
    pub fn count_blogs(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM blogs", [], |row| row.get(0))
            .context("failed to count blogs")
    }

    // ---- categories ----

    /// Lists categories by name, ascending.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at FROM categories ORDER BY name ASC",
        )?;
        let rows = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list categories")?;
        Ok(rows)
    }

    /// Fetches a category by id.
    pub fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.conn.lock();
        fetch_category(&conn, id)
    }

    /// Whether a category name is already taken, optionally ignoring
    /// one record.
    pub fn category_name_taken(&self, name: &str, exclude_id: Option<&str>) -> Result<bool> {
        let conn = self.conn.lock();
        let taken = conn
            .query_row(
                "SELECT COUNT(*) FROM categories WHERE name = ?1 AND (?2 IS NULL OR id != ?2)",
                params![name, exclude_id],
                |row| row.get::<_, i64>(0),
            )
            .context("failed to check category name")?;
        Ok(taken > 0)
    }

    /// Creates a category with a unique name.
    pub fn create_category(&self, name: &str) -> Result<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now_ms(),
        };
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![category.id, category.name, category.created_at],
        )
        .context("failed to insert category")?;
        Ok(category)
    }

    /// Renames a category.
    pub fn update_category(&self, id: &str, name: &str) -> Result<Option<Category>> {
        let conn = self.conn.lock();
        let Some(mut category) = fetch_category(&conn, id)? else {
            return Ok(None);
        };
        category.name = name.to_string();
        conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2",
            params![category.name, id],
        )
        .context("failed to update category")?;
        Ok(Some(category))
    }

    /// Deletes a category. The caller enforces the no-linked-videos
    /// guard first.
    pub fn delete_category(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])
            .context("failed to delete category")?;
        Ok(deleted > 0)
    }

    // ---- menu settings ----

    /// Reads the menu settings row, falling back to the defaults when
    /// nothing has been saved yet.
    pub fn menu_settings(&self) -> Result<MenuSettings> {
        let conn = self.conn.lock();
        let settings = conn
            .query_row(
                "SELECT show_videos_menu, show_blogs_menu FROM menu_settings WHERE id = 1",
                [],
                |row| {
                    Ok(MenuSettings {
                        show_videos_menu: row.get(0)?,
                        show_blogs_menu: row.get(1)?,
                    })
                },
            )
            .optional()
            .context("failed to read menu settings")?;
        Ok(settings.unwrap_or_default())
    }

    /// Upserts the menu settings row.
    pub fn update_menu_settings(&self, settings: MenuSettings) -> Result<MenuSettings> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO menu_settings (id, show_videos_menu, show_blogs_menu) \
             VALUES (1, ?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET show_videos_menu = ?1, show_blogs_menu = ?2",
            params![settings.show_videos_menu, settings.show_blogs_menu],
        )
        .context("failed to update menu settings")?;
        Ok(settings)
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn like_pattern(q: &str) -> String {
    let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn slug_taken(
    conn: &Connection,
    table: &str,
    slug: &str,
    exclude_id: Option<&str>,
) -> Result<bool> {
    let taken = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE slug = ?1 AND (?2 IS NULL OR id != ?2)"),
            params![slug, exclude_id],
            |row| row.get::<_, i64>(0),
        )
        .context("failed to check slug")?;
    Ok(taken > 0)
}

fn fetch_category(conn: &Connection, id: &str) -> Result<Option<Category>> {
    conn.query_row(
        "SELECT id, name, created_at FROM categories WHERE id = ?1",
        params![id],
        category_from_row,
    )
    .optional()
    .context("failed to fetch category")
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            youtube_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            thumbnail_path TEXT,
            likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
            dislikes INTEGER NOT NULL DEFAULT 0 CHECK (dislikes >= 0),
            discussion_enabled INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_videos_category ON videos (category_id);
        CREATE TABLE IF NOT EXISTS blogs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            category_id TEXT,
            thumbnail_path TEXT,
            likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
            dislikes INTEGER NOT NULL DEFAULT 0 CHECK (dislikes >= 0),
            discussion_enabled INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS menu_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            show_videos_menu INTEGER NOT NULL,
            show_blogs_menu INTEGER NOT NULL
        );",
    )
    .context("failed to create content tables")?;
    Ok(())
}

fn video_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        youtube_id: row.get("youtube_id")?,
        category_id: row.get("category_id")?,
        thumbnail_path: row.get("thumbnail_path")?,
        likes: row.get("likes")?,
        dislikes: row.get("dislikes")?,
        discussion_enabled: row.get("discussion_enabled")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn blog_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Blog> {
    Ok(Blog {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        content: row.get("content")?,
        category_id: row.get("category_id")?,
        thumbnail_path: row.get("thumbnail_path")?,
        likes: row.get("likes")?,
        dislikes: row.get("dislikes")?,
        discussion_enabled: row.get("discussion_enabled")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ContentStore {
        ContentStore::open_in_memory().expect("open in-memory store")
    }

    fn seeded_category(store: &ContentStore) -> Category {
        store.create_category("Tutorials").expect("create category")
    }

    fn video_input(title: &str, category_id: &str) -> VideoInput {
        VideoInput {
            title: title.to_string(),
            description: "a long enough description".to_string(),
            youtube_id: "dQw4w9WgXcQ".to_string(),
            category_id: category_id.to_string(),
            thumbnail_path: None,
            discussion_enabled: true,
        }
    }

    fn blog_input(title: &str) -> BlogInput {
        BlogInput {
            title: title.to_string(),
            content: "a long enough blog body".to_string(),
            category_id: None,
            thumbnail_path: None,
            discussion_enabled: true,
        }
    }

    #[test]
    fn video_round_trip_with_derived_slug() {
        let store = store();
        let category = seeded_category(&store);
        let video = store
            .create_video(video_input("Rust for the Web!", &category.id))
            .expect("create video");
        assert_eq!(video.slug, "rust-for-the-web");

        let by_slug = store
            .get_video_by_slug("rust-for-the-web")
            .expect("fetch by slug")
            .expect("exists");
        assert_eq!(by_slug, video);
    }

    #[test]
    fn creating_a_video_requires_an_existing_category() {
        let store = store();
        let result = store.create_video(video_input("Orphan", "missing-category"));
        assert!(result.is_err());
    }

    #[test]
    fn video_slug_check_respects_the_exclusion() {
        let store = store();
        let category = seeded_category(&store);
        let video = store
            .create_video(video_input("Hello World", &category.id))
            .expect("create video");

        assert!(store.video_slug_taken("hello-world", None).expect("check"));
        assert!(!store
            .video_slug_taken("hello-world", Some(&video.id))
            .expect("check with exclusion"));
    }

    #[test]
    fn update_recomputes_slug_and_keeps_thumbnail() {
        let store = store();
        let category = seeded_category(&store);
        let mut input = video_input("First Title", &category.id);
        input.thumbnail_path = Some("/uploads/a.jpg".to_string());
        let video = store.create_video(input).expect("create video");

        let mut patch = video_input("Second Title", &category.id);
        patch.thumbnail_path = None;
        let updated = store
            .update_video(&video.id, patch)
            .expect("update video")
            .expect("exists");
        assert_eq!(updated.slug, "second-title");
        assert_eq!(updated.thumbnail_path.as_deref(), Some("/uploads/a.jpg"));
    }

    #[test]
    fn listing_filters_by_search_and_category() {
        let store = store();
        let tutorials = seeded_category(&store);
        let news = store.create_category("News").expect("create category");
        store
            .create_video(video_input("Rust ownership explained", &tutorials.id))
            .expect("create one");
        store
            .create_video(video_input("Weekly roundup", &news.id))
            .expect("create two");

        let hits = store.list_videos(Some("ownership"), None).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust ownership explained");

        let in_news = store.list_videos(None, Some(&news.id)).expect("filter");
        assert_eq!(in_news.len(), 1);
        assert_eq!(in_news[0].title, "Weekly roundup");

        let none = store.list_videos(Some("ownership"), Some(&news.id)).expect("both");
        assert!(none.is_empty());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let store = store();
        let category = seeded_category(&store);
        store
            .create_video(video_input("Literally 100% safe", &category.id))
            .expect("create video");
        // A bare % would match everything; escaped it must match the
        // literal character.
        let hits = store.list_videos(Some("100%"), None).expect("search");
        assert_eq!(hits.len(), 1);
        let misses = store.list_videos(Some("200%"), None).expect("search");
        assert!(misses.is_empty());
    }

    #[test]
    fn blog_round_trip_and_count() {
        let store = store();
        let blog = store.create_blog(blog_input("My First Post")).expect("create blog");
        assert_eq!(blog.slug, "my-first-post");
        assert_eq!(store.count_blogs().expect("count"), 1);

        assert!(store.delete_blog(&blog.id).expect("delete"));
        assert_eq!(store.count_blogs().expect("count"), 0);
        assert!(!store.delete_blog(&blog.id).expect("repeat delete"));
    }

    #[test]
    fn category_names_are_checked_for_uniqueness() {
        let store = store();
        let category = seeded_category(&store);
        assert!(store.category_name_taken("Tutorials", None).expect("check"));
        assert!(!store
            .category_name_taken("Tutorials", Some(&category.id))
            .expect("check with exclusion"));
        assert!(!store.category_name_taken("Reviews", None).expect("check"));
    }

    #[test]
    fn category_video_count_backs_the_delete_guard() {
        let store = store();
        let category = seeded_category(&store);
        store
            .create_video(video_input("Linked", &category.id))
            .expect("create video");
        assert_eq!(
            store.count_videos_in_category(&category.id).expect("count"),
            1
        );
    }

    #[test]
    fn menu_settings_default_then_upsert() {
        let store = store();
        assert_eq!(store.menu_settings().expect("defaults"), MenuSettings::default());

        let saved = store
            .update_menu_settings(MenuSettings { show_videos_menu: false, show_blogs_menu: true })
            .expect("save");
        assert_eq!(store.menu_settings().expect("read back"), saved);

        store
            .update_menu_settings(MenuSettings { show_videos_menu: true, show_blogs_menu: false })
            .expect("overwrite");
        assert!(store.menu_settings().expect("read back").show_videos_menu);
    }

    #[test]
    fn vote_counter_writes_round_trip() {
        let store = store();
        let category = seeded_category(&store);
        let video = store
            .create_video(video_input("Votable", &category.id))
            .expect("create video");
        store
            .update_video_votes(&video.id, VoteCounts { likes: 2, dislikes: 1 })
            .expect("write counters");
        let fetched = store.get_video(&video.id).expect("fetch").expect("exists");
        assert_eq!((fetched.likes, fetched.dislikes), (2, 1));
    }
}
