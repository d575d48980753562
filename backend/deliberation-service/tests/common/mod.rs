//! Shared helpers for deliberation-service integration tests
#![allow(dead_code)] // helpers are shared across suites; not every binary uses all of them

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Once};

use chrono::Utc;
use deliberation_service::models::{
    Author, CommentAuthor, ContentBlock, EducationBlock, PollBlock, PollOption, Post,
};
use deliberation_service::Config;
use document_store::DocumentStore;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fresh store per test, wired from the environment the way the UI layer
/// would wire it, with tracing set up once per binary.
pub fn store() -> Arc<DocumentStore> {
    init_tracing();
    Arc::new(DocumentStore::new(Config::from_env().store))
}

pub fn author(uid: &str) -> CommentAuthor {
    CommentAuthor {
        uid: uid.to_string(),
        name: format!("user-{uid}"),
        avatar_url: String::new(),
    }
}

/// A post with no blocks and zeroed counters.
pub fn bare_post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        author: Author {
            uid: "founder".to_string(),
            name: "Helios".to_string(),
            handle: "helios".to_string(),
            avatar_url: String::new(),
        },
        title: "Data sovereignty act".to_string(),
        content: "Full proposal text".to_string(),
        likes: 0,
        likers: BTreeSet::new(),
        comments: 0,
        reposts: 0,
        destinations: Vec::new(),
        blocks: Vec::new(),
        created_at: Utc::now(),
    }
}

/// A post carrying an education block followed by a poll block, so poll
/// lookups have to skip a non-poll variant.
pub fn poll_post(id: &str, options: &[&str]) -> Post {
    let mut post = bare_post(id);
    post.blocks = vec![
        ContentBlock::Education(EducationBlock::default()),
        ContentBlock::Poll(PollBlock {
            question: "Adopt the proposal?".to_string(),
            options: options
                .iter()
                .map(|text| PollOption {
                    text: text.to_string(),
                    votes: 0,
                    proposer: None,
                })
                .collect(),
            voters: BTreeMap::new(),
        }),
    ];
    post
}

pub async fn seed(store: &DocumentStore, post: &Post) {
    store.set("posts", &post.id, post).await.unwrap();
}

pub async fn fetch_post(store: &DocumentStore, id: &str) -> Post {
    store
        .get("posts", id)
        .await
        .unwrap()
        .expect("post should exist")
}

/// Vote ledger invariant: every option's tally equals the number of
/// voter-map entries holding that option's text.
pub fn assert_vote_invariant(post: &Post) {
    let poll = post.poll_block().expect("post should carry a poll");
    for option in &poll.options {
        assert_eq!(
            option.votes,
            poll.voters_for(&option.text) as i64,
            "tally for option {:?} drifted from the voter map",
            option.text
        );
    }
}

/// Counter ledger invariant: the like total always matches the liker set.
pub fn assert_like_invariant(post: &Post) {
    assert_eq!(post.likes, post.likers.len() as i64);
}
