//! Discussion flow - comments and replies with atomic counter upkeep
//!
//! The comment insert and the post's `comments` counter increment always
//! travel in one transaction. The counter is never a fire-and-forget side
//! write: two replies landing in the same instant must move the counter by
//! two, not one.

use std::sync::Arc;

use chrono::Utc;
use document_store::DocumentStore;
use tracing::info;
use uuid::Uuid;

use super::{comments_collection, POSTS};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Comment, CommentAuthor, Post};

pub struct DiscussionService {
    store: Arc<DocumentStore>,
}

impl DiscussionService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Add a top-level comment to a post.
    pub async fn add_comment(
        &self,
        post_id: &str,
        author: &CommentAuthor,
        text: &str,
    ) -> ServiceResult<Comment> {
        self.insert_comment(post_id, None, author, text).await
    }

    /// Reply to an existing comment.
    ///
    /// `parent_comment_id` is stored exactly as targeted; the tree builder
    /// flattens anything deeper than one level at render time.
    pub async fn reply(
        &self,
        post_id: &str,
        parent_comment_id: &str,
        author: &CommentAuthor,
        text: &str,
    ) -> ServiceResult<Comment> {
        self.insert_comment(post_id, Some(parent_comment_id), author, text)
            .await
    }

    /// Full flat comment set for a post; feed this to
    /// [`super::build_comment_tree`] on every snapshot update.
    pub async fn comments(&self, post_id: &str) -> ServiceResult<Vec<Comment>> {
        Ok(self.store.list(&comments_collection(post_id)).await?)
    }

    async fn insert_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        author: &CommentAuthor,
        text: &str,
    ) -> ServiceResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidInput(
                "comment text is empty".to_string(),
            ));
        }

        let collection = comments_collection(post_id);
        let comment = self
            .store
            .run_transaction(|tx| -> ServiceResult<Comment> {
                let mut post: Post = tx
                    .get(POSTS, post_id)?
                    .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))?;
                post.comments += 1;

                let comment = Comment {
                    id: Uuid::new_v4().to_string(),
                    author: author.clone(),
                    content: text.to_string(),
                    timestamp: Utc::now(),
                    parent_id: parent_id.map(str::to_string),
                    likes: 0,
                    is_option_proposal: false,
                    is_processed: false,
                };

                tx.set(&collection, &comment.id, &comment)?;
                tx.set(POSTS, post_id, &post)?;
                Ok(comment)
            })
            .await?;

        info!(
            post_id,
            comment_id = %comment.id,
            parent_id = ?comment.parent_id,
            "comment added"
        );
        Ok(comment)
    }
}
