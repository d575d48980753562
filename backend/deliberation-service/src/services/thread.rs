//! Comment tree builder - flat comment records to a two-level display forest
//!
//! Pure and read-only: recomputed from the full flat snapshot on every
//! update, never persisted.

use std::collections::HashMap;

use crate::models::Comment;

/// A top-level comment with its attached replies.
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Assemble the flat comment set into a rendering-ready forest.
///
/// Display depth is capped at one level: every reply renders directly under
/// its top-level ancestor, even if its `parent_id` chain is deeper. Top-level
/// comments are ordered most recent first; replies keep ascending timestamp
/// order under their parent. Replies whose ancestor chain cannot be resolved
/// within the snapshot are left out of the view (they remain in storage).
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let by_id: HashMap<&str, &Comment> = comments
        .iter()
        .map(|comment| (comment.id.as_str(), comment))
        .collect();

    let mut nodes: Vec<CommentNode> = comments
        .iter()
        .filter(|comment| comment.parent_id.is_none())
        .map(|comment| CommentNode {
            comment: comment.clone(),
            replies: Vec::new(),
        })
        .collect();
    nodes.sort_by(|a, b| b.comment.timestamp.cmp(&a.comment.timestamp));

    let slot_by_id: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(slot, node)| (node.comment.id.clone(), slot))
        .collect();

    let mut replies: Vec<&Comment> = comments
        .iter()
        .filter(|comment| comment.parent_id.is_some())
        .collect();
    replies.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    for reply in replies {
        let anchor = match top_level_ancestor(reply, &by_id, comments.len()) {
            Some(anchor) => anchor,
            None => continue, // orphaned or cyclic chain: not rendered
        };
        if let Some(&slot) = slot_by_id.get(anchor) {
            nodes[slot].replies.push(reply.clone());
        }
    }

    nodes
}

/// Walk the `parent_id` chain up to the top-level comment, bounded by the
/// snapshot size so a corrupt cyclic chain cannot loop forever.
fn top_level_ancestor<'a>(
    comment: &'a Comment,
    by_id: &HashMap<&str, &'a Comment>,
    max_hops: usize,
) -> Option<&'a str> {
    let mut current = comment;
    let mut hops = 0;
    while let Some(parent_id) = current.parent_id.as_deref() {
        current = by_id.get(parent_id)?;
        hops += 1;
        if hops > max_hops {
            return None;
        }
    }
    Some(current.id.as_str())
}
