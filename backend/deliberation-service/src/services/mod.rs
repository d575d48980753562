//! Business logic layer
//!
//! One service per operation family. Every mutating service runs its whole
//! read-validate-write cycle inside a single store transaction; nothing here
//! performs a plain read-then-unconditional-write against contended state.

pub mod discussion;
pub mod likes;
pub mod proposals;
pub mod thread;
pub mod votes;

pub use discussion::DiscussionService;
pub use likes::{EngagementService, LikeOutcome};
pub use proposals::ProposalService;
pub use thread::{build_comment_tree, CommentNode};
pub use votes::{VoteOutcome, VoteService};

/// Root collection for post documents.
pub(crate) const POSTS: &str = "posts";

/// Per-post comment sub-collection path.
pub(crate) fn comments_collection(post_id: &str) -> String {
    format!("posts/{post_id}/comments")
}
