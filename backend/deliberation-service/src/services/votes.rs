//! Vote ledger - poll voting with one live vote per user per poll

use std::sync::Arc;

use document_store::DocumentStore;
use tracing::info;

use super::POSTS;
use crate::error::{ServiceError, ServiceResult};
use crate::models::Post;

/// Outcome of a vote attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was recorded.
    Recorded,
    /// The user already holds a vote in this poll; nothing was written.
    /// Informational, not an error: double-clicks are not punished.
    AlreadyVoted { current_choice: String },
}

pub struct VoteService {
    store: Arc<DocumentStore>,
}

impl VoteService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Cast `user_id`'s vote for the option at `option_index`.
    ///
    /// The voter map is keyed by option *text*: indices shift when the
    /// proposal pipeline appends options concurrently, so identity has to be
    /// by content, not position. The whole `blocks` array is written back;
    /// non-poll blocks pass through untouched.
    pub async fn cast_vote(
        &self,
        post_id: &str,
        option_index: usize,
        user_id: &str,
    ) -> ServiceResult<VoteOutcome> {
        let outcome = self
            .store
            .run_transaction(|tx| -> ServiceResult<VoteOutcome> {
                let mut post: Post = tx
                    .get(POSTS, post_id)?
                    .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))?;

                let poll = post.poll_block_mut().ok_or_else(|| {
                    ServiceError::InvalidState(format!("post {post_id} carries no poll block"))
                })?;

                if let Some(current) = poll.voters.get(user_id) {
                    return Ok(VoteOutcome::AlreadyVoted {
                        current_choice: current.clone(),
                    });
                }

                let option = poll.options.get_mut(option_index).ok_or_else(|| {
                    ServiceError::InvalidInput(format!(
                        "option index {option_index} out of range"
                    ))
                })?;
                option.votes += 1;
                let choice = option.text.clone();
                poll.voters.insert(user_id.to_string(), choice);

                tx.set(POSTS, post_id, &post)?;
                Ok(VoteOutcome::Recorded)
            })
            .await?;

        match &outcome {
            VoteOutcome::Recorded => {
                info!(post_id, user_id, option_index, "vote recorded");
            }
            VoteOutcome::AlreadyVoted { current_choice } => {
                info!(post_id, user_id, current_choice, "vote ignored, user already voted");
            }
        }
        Ok(outcome)
    }
}
