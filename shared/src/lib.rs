//! Shared domain layer for the vidblog content site.
//!
//! Holds the persisted stores (videos, blogs, categories, comments),
//! the comment tree builder, the vote ledger/engine and the text
//! sanitation helpers. HTTP concerns live in the backend crate.

pub mod comment_tree;
pub mod comments_store;
pub mod content_store;
pub mod text;
pub mod vote;

pub use comment_tree::{build_comment_tree, CommentNode};
pub use comments_store::{Comment, CommentFamily, CommentStatus, CommentStore, NewComment};
pub use content_store::{
    Blog, BlogInput, Category, ContentStore, MenuSettings, Video, VideoInput,
};
pub use text::{sanitize_text, slugify};
pub use vote::{
    apply_vote, VoteCategory, VoteChoice, VoteCounts, VoteError, VoteLedger, VoteOutcome,
};
