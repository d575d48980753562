//! Option proposal pipeline - a comment that becomes a first-class poll option
//!
//! One transaction covers all four effects: the proposal comment, the post's
//! comment counter, the appended option, and the proposer's seed vote. A
//! retry after losing a race to a concurrent proposal re-reads the
//! now-longer option list before reapplying the append, so both proposals
//! survive.

use std::sync::Arc;

use chrono::Utc;
use document_store::DocumentStore;
use tracing::info;
use uuid::Uuid;

use super::{comments_collection, POSTS};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Comment, CommentAuthor, PollOption, Post, Proposer};

pub struct ProposalService {
    store: Arc<DocumentStore>,
}

impl ProposalService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Submit `text` as both a discussion comment and a new poll option,
    /// with an implicit first vote from the proposer.
    ///
    /// If the proposer already voted elsewhere in the poll, the proposal
    /// supersedes that vote: the voter-map entry is rewritten and the old
    /// option's tally is decremented in the same transaction, keeping every
    /// option's count equal to its voter-map entries.
    ///
    /// Proposing text identical to an existing option adds no new option;
    /// it counts as a vote for that option. The proposal comment is
    /// recorded either way.
    pub async fn propose_option(
        &self,
        post_id: &str,
        proposer: &CommentAuthor,
        text: &str,
    ) -> ServiceResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidInput(
                "proposal text is empty".to_string(),
            ));
        }

        let comments = comments_collection(post_id);
        let comment = self
            .store
            .run_transaction(|tx| -> ServiceResult<Comment> {
                let mut post: Post = tx
                    .get(POSTS, post_id)?
                    .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))?;

                // Validate before any buffered write: a post without a poll
                // cannot host the option, and must not gain the comment either.
                let poll = post.poll_block_mut().ok_or_else(|| {
                    ServiceError::InvalidState(format!("post {post_id} carries no poll block"))
                })?;

                let superseded = poll
                    .voters
                    .insert(proposer.uid.clone(), text.to_string());
                if let Some(previous_choice) = &superseded {
                    if previous_choice != text {
                        if let Some(previous) = poll
                            .options
                            .iter_mut()
                            .find(|option| option.text == *previous_choice)
                        {
                            previous.votes -= 1;
                        }
                    }
                }

                // Proposing text that already matches a listed option must
                // not mint a second option claiming the same voter-map
                // entries; it collapses into a vote for the existing one.
                match poll.options.iter_mut().find(|option| option.text == text) {
                    Some(existing) => {
                        if superseded.as_deref() != Some(text) {
                            existing.votes += 1;
                        }
                    }
                    None => poll.options.push(PollOption {
                        text: text.to_string(),
                        votes: 1,
                        proposer: Some(Proposer {
                            uid: proposer.uid.clone(),
                            name: proposer.name.clone(),
                        }),
                    }),
                }

                post.comments += 1;

                let comment = Comment {
                    id: Uuid::new_v4().to_string(),
                    author: proposer.clone(),
                    content: text.to_string(),
                    timestamp: Utc::now(),
                    parent_id: None,
                    likes: 0,
                    is_option_proposal: true,
                    is_processed: false,
                };

                tx.set(&comments, &comment.id, &comment)?;
                tx.set(POSTS, post_id, &post)?;
                Ok(comment)
            })
            .await?;

        info!(post_id, proposer_uid = %proposer.uid, option = text, "option proposed");
        Ok(comment)
    }
}
