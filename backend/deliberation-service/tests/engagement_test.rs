//! Integration tests: like toggling (counter ledger)
//!
//! Coverage:
//! - toggle on / toggle off scenario from a clean post
//! - `likes == likers.len()` after every committed state
//! - two distinct users toggling simultaneously are both reflected
//! - missing post surfaces NotFound
//! - subscribers observe the new total and membership atomically

mod common;

use common::{assert_like_invariant, bare_post, fetch_post, seed, store};
use deliberation_service::services::EngagementService;
use deliberation_service::ServiceError;
use futures::future::join_all;
use std::sync::Arc;

#[tokio::test]
async fn toggle_adds_then_removes_the_like() {
    let store = store();
    seed(&store, &bare_post("p1")).await;
    let service = EngagementService::new(Arc::clone(&store));

    let outcome = service.toggle_like("p1", "user-a").await.unwrap();
    assert!(outcome.liked);
    let post = fetch_post(&store, "p1").await;
    assert_eq!(post.likes, 1);
    assert!(post.likers.contains("user-a"));
    assert_like_invariant(&post);

    let outcome = service.toggle_like("p1", "user-a").await.unwrap();
    assert!(!outcome.liked);
    let post = fetch_post(&store, "p1").await;
    assert_eq!(post.likes, 0);
    assert!(post.likers.is_empty());
    assert_like_invariant(&post);
}

#[tokio::test]
async fn toggling_a_missing_post_is_not_found() {
    let store = store();
    let service = EngagementService::new(Arc::clone(&store));

    let err = service.toggle_like("gone", "user-a").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn simultaneous_likes_by_distinct_users_are_both_reflected() {
    let store = store();
    seed(&store, &bare_post("p1")).await;
    let service = Arc::new(EngagementService::new(Arc::clone(&store)));

    let users = ["user-a", "user-b", "user-c", "user-d"];
    let tasks: Vec<_> = users
        .iter()
        .map(|user| {
            let service = Arc::clone(&service);
            let user = user.to_string();
            tokio::spawn(async move { service.toggle_like("p1", &user).await })
        })
        .collect();
    for outcome in join_all(tasks).await {
        assert!(outcome.unwrap().unwrap().liked);
    }

    let post = fetch_post(&store, "p1").await;
    assert_eq!(post.likes, users.len() as i64);
    for user in users {
        assert!(post.likers.contains(user));
    }
    assert_like_invariant(&post);
}

#[tokio::test]
async fn subscribers_see_total_and_membership_move_together() {
    let store = store();
    seed(&store, &bare_post("p1")).await;
    let service = EngagementService::new(Arc::clone(&store));

    let mut rx = store.subscribe("posts", "p1").await;
    service.toggle_like("p1", "user-a").await.unwrap();
    rx.changed().await.unwrap();

    let snapshot: deliberation_service::models::Post =
        serde_json::from_value(rx.borrow().clone().unwrap()).unwrap();
    assert_eq!(snapshot.likes, 1);
    assert!(snapshot.likers.contains("user-a"));
    assert_like_invariant(&snapshot);
}
