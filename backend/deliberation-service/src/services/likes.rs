//! Counter ledger - transactional like toggling on posts

use std::sync::Arc;

use document_store::DocumentStore;
use tracing::info;

use super::POSTS;
use crate::error::{ServiceError, ServiceResult};
use crate::models::Post;

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Whether the user holds a like on the post after the toggle
    pub liked: bool,
}

pub struct EngagementService {
    store: Arc<DocumentStore>,
}

impl EngagementService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Toggle `user_id`'s like on a post.
    ///
    /// One transaction, so `likes` and membership in `likers` move together
    /// and no subscriber ever observes `likes != likers.len()`. Write-write
    /// races against other engagement are replayed by the store.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> ServiceResult<LikeOutcome> {
        let outcome = self
            .store
            .run_transaction(|tx| -> ServiceResult<LikeOutcome> {
                let mut post: Post = tx
                    .get(POSTS, post_id)?
                    .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))?;

                let liked = if post.likers.remove(user_id) {
                    post.likes -= 1;
                    false
                } else {
                    post.likers.insert(user_id.to_string());
                    post.likes += 1;
                    true
                };
                debug_assert_eq!(post.likes, post.likers.len() as i64);

                tx.set(POSTS, post_id, &post)?;
                Ok(LikeOutcome { liked })
            })
            .await?;

        info!(post_id, user_id, liked = outcome.liked, "like toggled");
        Ok(outcome)
    }
}
