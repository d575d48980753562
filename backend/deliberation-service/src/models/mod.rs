//! Document shapes for the deliberation engine
//!
//! These are the exact JSON shapes persisted in the document store; field
//! names stay camelCase on the wire so documents written by other platform
//! clients deserialize unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Post author identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub uid: String,
    pub name: String,
    pub handle: String,
    pub avatar_url: String,
}

/// A page/community/entity the post is broadcast to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Post - root aggregate and the unit of write contention.
///
/// Invariants maintained by the services layer, atomically per transaction:
/// - `likes == likers.len()`
/// - `comments` equals the size of the post's comment sub-collection
/// - for every poll option, `votes` equals the number of voter-map entries
///   holding that option's text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: Author,
    pub title: String,
    pub content: String,
    pub likes: i64,
    #[serde(default)]
    pub likers: BTreeSet<String>,
    pub comments: i64,
    pub reposts: i64,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Linear type-discriminated scan for the post's poll block, if any.
    pub fn poll_block(&self) -> Option<&PollBlock> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::Poll(poll) => Some(poll),
            _ => None,
        })
    }

    pub fn poll_block_mut(&mut self) -> Option<&mut PollBlock> {
        self.blocks.iter_mut().find_map(|block| match block {
            ContentBlock::Poll(poll) => Some(poll),
            _ => None,
        })
    }
}

/// Content block inside a post, discriminated by the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Poll(PollBlock),
    Education(EducationBlock),
}

/// Embedded poll: the voteable question with an evolving option list.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PollBlock {
    pub question: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
    /// user id -> option text. Keyed by text, not index: indices shift when
    /// proposed options are appended concurrently, text does not.
    #[serde(default)]
    pub voters: BTreeMap<String, String>,
}

impl PollBlock {
    /// Number of voter-map entries currently pointing at `text`.
    pub fn voters_for(&self, text: &str) -> usize {
        self.voters.values().filter(|choice| *choice == text).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub text: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<Proposer>,
}

/// Attribution for an option added through the proposal pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proposer {
    pub uid: String,
    pub name: String,
}

/// Education block: carried opaquely, the engine never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EducationBlock {
    #[serde(default)]
    pub sub_area: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub prerequisites: String,
}

/// Comment author identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub uid: String,
    pub name: String,
    pub avatar_url: String,
}

/// Comment record, stored under the per-post sub-collection.
///
/// `parent_id == None` means top-level. Content is immutable once created;
/// there is no edit or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: CommentAuthor,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub likes: i64,
    #[serde(default)]
    pub is_option_proposal: bool,
    /// Reserved for the moderation workflow; written, never consumed here.
    #[serde(default)]
    pub is_processed: bool,
}
