use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use vidblog_shared::{CommentStore, ContentStore, VoteLedger};

/// Shared application state handed to every handler.
///
/// The vote ledger lives in process memory only; restarting the
/// server lets everyone vote again, which matches the session-scoped
/// voting model.
#[derive(Clone)]
pub struct AppState {
    /// Videos, blogs, categories and menu settings.
    pub content: Arc<ContentStore>,
    /// Both comment families.
    pub comments: Arc<CommentStore>,
    /// Session vote memory for all four vote categories.
    pub votes: Arc<Mutex<VoteLedger>>,
}

impl AppState {
    pub fn new(data_dir: &str) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {data_dir}"))?;
        let content_path = Path::new(data_dir).join("content.db");
        let comments_path = Path::new(data_dir).join("comments.db");

        let content = ContentStore::open(&content_path.to_string_lossy())?;
        let comments = CommentStore::open(&comments_path.to_string_lossy())?;

        Ok(Self {
            content: Arc::new(content),
            comments: Arc::new(comments),
            votes: Arc::new(Mutex::new(VoteLedger::new())),
        })
    }

    /// State over in-memory stores, used by handler tests.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            content: Arc::new(ContentStore::open_in_memory()?),
            comments: Arc::new(CommentStore::open_in_memory()?),
            votes: Arc::new(Mutex::new(VoteLedger::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_the_data_directory_and_databases() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let data_dir = dir.path().join("nested").join("data");
        let data_dir = data_dir.to_string_lossy();

        let state = AppState::new(&data_dir).expect("initialize state");
        assert_eq!(state.content.count_videos().expect("count"), 0);
        assert!(Path::new(&*data_dir).join("content.db").exists());
        assert!(Path::new(&*data_dir).join("comments.db").exists());
    }
}
