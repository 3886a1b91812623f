//! Reconstructs a threaded comment forest from a flat listing.
//!
//! Input is the approved comments of one entity in creation order.
//! Because a reply can only name a comment that already existed when
//! it was posted, the reference graph is acyclic by construction; the
//! builder still guards against malformed links instead of trusting
//! the data blindly.

use std::collections::HashMap;

use serde::Serialize;

use crate::comments_store::Comment;

/// One node of the rendered comment forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    /// Comment id.
    pub id: String,
    /// Display name of the author.
    pub author_name: String,
    /// Message body.
    pub message: String,
    /// Like counter.
    pub likes: i64,
    /// Dislike counter.
    pub dislikes: i64,
    /// Creation timestamp, milliseconds since the epoch.
    pub created_at: i64,
    /// Direct replies, in creation order.
    pub replies: Vec<CommentNode>,
}

impl From<&Comment> for CommentNode {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            author_name: comment.author_name.clone(),
            message: comment.message.clone(),
            likes: comment.likes,
            dislikes: comment.dislikes,
            created_at: comment.created_at,
            replies: Vec::new(),
        }
    }
}

/// Builds the reply forest from a flat, creation-ordered listing.
///
/// Two passes: first an id -> arena index map over all comments, then
/// a linking pass that attaches each comment under its parent's
/// replies. A comment whose `parent_comment_id` is unset, does not
/// resolve within the input, or points at itself goes to the root
/// list instead — this covers true top-level comments as well as
/// orphans whose parent was deleted or is no longer approved.
/// Relative order is preserved everywhere; the whole thing is O(n).
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let index: HashMap<&str, usize> = comments
        .iter()
        .enumerate()
        .map(|(position, comment)| (comment.id.as_str(), position))
        .collect();

    let mut nodes: Vec<Option<CommentNode>> = comments.iter().map(|c| Some(c.into())).collect();
    let mut child_indices: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut root_indices: Vec<usize> = Vec::new();

    for (position, comment) in comments.iter().enumerate() {
        let parent = comment
            .parent_comment_id
            .as_deref()
            .and_then(|id| index.get(id).copied())
            .filter(|&parent| parent != position);
        match parent {
            Some(parent) => child_indices[parent].push(position),
            None => root_indices.push(position),
        }
    }

    root_indices
        .into_iter()
        .filter_map(|root| take_subtree(root, &mut nodes, &child_indices))
        .collect()
}

fn take_subtree(
    position: usize,
    nodes: &mut [Option<CommentNode>],
    child_indices: &[Vec<usize>],
) -> Option<CommentNode> {
    // A node already moved into another subtree (possible only with a
    // malformed reference cycle) is skipped rather than duplicated.
    let mut node = nodes[position].take()?;
    node.replies = child_indices[position]
        .iter()
        .filter_map(|&child| take_subtree(child, nodes, child_indices))
        .collect();
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments_store::CommentStatus;

    fn comment(id: &str, parent: Option<&str>, created_at: i64) -> Comment {
        Comment {
            id: id.to_string(),
            parent_entity_id: "vid-1".to_string(),
            parent_comment_id: parent.map(str::to_string),
            author_name: format!("author-{id}"),
            message: format!("message {id}"),
            likes: 0,
            dislikes: 0,
            status: CommentStatus::Approved,
            created_at,
        }
    }

    fn ids(forest: &[CommentNode]) -> Vec<&str> {
        forest.iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn empty_input_builds_an_empty_forest() {
        assert!(build_comment_tree(&[]).is_empty());
    }

    #[test]
    fn links_replies_and_promotes_orphans() {
        // A(root), B(parent=A), C(parent=B), D(parent missing).
        let comments = vec![
            comment("A", None, 1),
            comment("B", Some("A"), 2),
            comment("C", Some("B"), 3),
            comment("D", Some("missing"), 4),
        ];

        let forest = build_comment_tree(&comments);
        assert_eq!(ids(&forest), vec!["A", "D"]);
        assert_eq!(ids(&forest[0].replies), vec!["B"]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec!["C"]);
        assert!(forest[1].replies.is_empty());
    }

    #[test]
    fn children_of_a_hidden_parent_stay_visible_at_top_level() {
        // The blocked parent never reaches the builder; its replies
        // arrive with a dangling parent id and must not disappear.
        let comments = vec![
            comment("root", None, 1),
            comment("reply-1", Some("blocked-parent"), 3),
            comment("reply-2", Some("blocked-parent"), 4),
        ];

        let forest = build_comment_tree(&comments);
        assert_eq!(ids(&forest), vec!["root", "reply-1", "reply-2"]);
    }

    #[test]
    fn sibling_order_follows_creation_order() {
        let comments = vec![
            comment("A", None, 1),
            comment("B", Some("A"), 2),
            comment("C", Some("A"), 3),
            comment("D", Some("A"), 4),
        ];

        let forest = build_comment_tree(&comments);
        assert_eq!(ids(&forest), vec!["A"]);
        assert_eq!(ids(&forest[0].replies), vec!["B", "C", "D"]);
    }

    #[test]
    fn self_referential_comment_is_treated_as_top_level() {
        let comments = vec![comment("A", Some("A"), 1)];
        let forest = build_comment_tree(&comments);
        assert_eq!(ids(&forest), vec!["A"]);
        assert!(forest[0].replies.is_empty());
    }

    #[test]
    fn serialized_forest_nests_replies() {
        let comments = vec![comment("A", None, 1), comment("B", Some("A"), 2)];
        let value =
            serde_json::to_value(build_comment_tree(&comments)).expect("serialize forest");
        assert_eq!(value[0]["id"], "A");
        assert_eq!(value[0]["replies"][0]["id"], "B");
        assert_eq!(value[0]["replies"][0]["replies"], serde_json::json!([]));
    }

    #[test]
    fn node_carries_the_comment_fields() {
        let mut source = comment("A", None, 42);
        source.likes = 7;
        source.dislikes = 2;
        let forest = build_comment_tree(&[source.clone()]);
        assert_eq!(forest[0].author_name, source.author_name);
        assert_eq!(forest[0].message, source.message);
        assert_eq!(forest[0].likes, 7);
        assert_eq!(forest[0].dislikes, 2);
        assert_eq!(forest[0].created_at, 42);
    }
}
