use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::shared_types::Post;
use crate::store::FeedStore;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("user not found: {0}")]
    UserNotFound(String),
}

/// Assembles the feed for `user_id`: the user's own posts plus the posts
/// of everyone they follow, sorted by creation time descending.
///
/// Only the primary user lookup can fail the request. Every per-source
/// post fetch is best-effort: a followee whose posts cannot be read (or
/// who does not exist) contributes nothing and the rest of the feed is
/// served anyway.
pub async fn build_feed(store: &dyn FeedStore, user_id: &str) -> Result<Vec<Post>, FeedError> {
    let user = match store.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(FeedError::UserNotFound(user_id.to_string())),
        Err(err) => {
            warn!(user_id, error = %err, "primary user lookup failed");
            return Err(FeedError::UserNotFound(user_id.to_string()));
        }
    };

    let mut sources = Vec::with_capacity(user.following.len() + 1);
    sources.push(user.id);
    sources.extend(user.following);

    // Independent read-only fetches, joined before the merge.
    let fetched = join_all(sources.iter().map(|id| store.posts_by_user(id))).await;

    let mut feed = Vec::new();
    for (source, outcome) in sources.iter().zip(fetched) {
        match outcome {
            Ok(posts) => feed.extend(posts),
            Err(err) => debug!(%source, error = %err, "skipping unavailable source"),
        }
    }

    // One global sort over the merged collection, newest first. Fetch
    // order is irrelevant.
    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::store::MemoryStore;

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn merges_own_and_followed_posts_newest_first() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u2"]);
        store.add_user("u2", &[]);
        store.add_post("u1", "p1", now - Duration::hours(1));
        store.add_post("u1", "p2", now - Duration::hours(2));
        store.add_post("u2", "p3", now - Duration::minutes(30));

        let feed = build_feed(&store, "u1").await.unwrap();
        assert_eq!(ids(&feed), ["p3", "p1", "p2"]);
    }

    #[tokio::test]
    async fn excludes_posts_from_unfollowed_users() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u2"]);
        store.add_user("u2", &[]);
        store.add_user("u3", &[]);
        store.add_post("u1", "p1", now);
        store.add_post("u2", "p2", now - Duration::minutes(5));
        store.add_post("u3", "p3", now - Duration::minutes(1));

        let feed = build_feed(&store, "u1").await.unwrap();
        assert_eq!(ids(&feed), ["p1", "p2"]);
    }

    #[tokio::test]
    async fn ordering_is_globally_descending() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u2", "u3"]);
        store.add_user("u2", &[]);
        store.add_user("u3", &[]);
        // Interleaved timestamps across authors.
        store.add_post("u1", "p1", now - Duration::minutes(10));
        store.add_post("u1", "p2", now - Duration::minutes(40));
        store.add_post("u2", "p3", now - Duration::minutes(25));
        store.add_post("u3", "p4", now - Duration::minutes(5));
        store.add_post("u3", "p5", now - Duration::minutes(55));

        let feed = build_feed(&store, "u1").await.unwrap();
        assert_eq!(ids(&feed), ["p4", "p1", "p3", "p2", "p5"]);
        for pair in feed.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn unknown_primary_user_is_an_error() {
        let store = MemoryStore::default();
        let err = build_feed(&store, "does-not-exist").await.unwrap_err();
        assert!(matches!(err, FeedError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_followee_contributes_nothing() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u3"]);
        store.add_post("u1", "p1", now);

        let feed = build_feed(&store, "u1").await.unwrap();
        assert_eq!(ids(&feed), ["p1"]);
    }

    #[tokio::test]
    async fn quiet_graph_yields_empty_feed() {
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u2"]);
        store.add_user("u2", &[]);

        let feed = build_feed(&store, "u1").await.unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn failing_source_degrades_instead_of_aborting() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u2", "u3"]);
        store.add_user("u2", &[]);
        store.add_user("u3", &[]);
        store.add_post("u1", "p1", now - Duration::minutes(2));
        store.add_post("u2", "p2", now - Duration::minutes(1));
        store.add_post("u3", "p3", now);
        store.fail_posts_for("u2");

        let feed = build_feed(&store, "u1").await.unwrap();
        assert_eq!(ids(&feed), ["p3", "p1"]);
    }

    #[tokio::test]
    async fn repeated_calls_return_the_same_set() {
        let now = Utc::now();
        let mut store = MemoryStore::default();
        store.add_user("u1", &["u2"]);
        store.add_user("u2", &[]);
        store.add_post("u1", "p1", now);
        store.add_post("u2", "p2", now);
        store.add_post("u2", "p3", now - Duration::hours(3));

        let first = build_feed(&store, "u1").await.unwrap();
        let second = build_feed(&store, "u1").await.unwrap();

        let mut first_ids = ids(&first);
        let mut second_ids = ids(&second);
        first_ids.sort();
        second_ids.sort();
        assert_eq!(first_ids, second_ids);
    }
}
