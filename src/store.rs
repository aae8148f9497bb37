use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::debug;

use crate::shared_types::{Post, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Read-only capability over the social graph and its content. The feed
/// assembler only ever talks to this trait, never to Redis directly.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Returns `Ok(None)` when no record exists for `id`.
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// All posts authored by `user_id`, in no particular order. A user
    /// that does not exist or has authored nothing yields an empty vec,
    /// not an error.
    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, StoreError>;
}

/// Live implementation backed by Redis.
///
/// Key scheme: `user:{id}` is a hash of profile fields, `post:{id}` a hash
/// of post fields, and `followers:{id}` / `following:{id}` / `posts:{id}`
/// are id lists.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    // Membership lists are best-effort: a failed read degrades to an
    // empty list instead of failing the user lookup.
    async fn id_list(conn: &mut ConnectionManager, key: &str) -> Vec<String> {
        match conn.lrange(key, 0, -1).await {
            Ok(ids) => ids,
            Err(err) => {
                debug!(key, error = %err, "list read failed, treating as empty");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FeedStore for RedisStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(format!("user:{id}")).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let followers = Self::id_list(&mut conn, &format!("followers:{id}")).await;
        let following = Self::id_list(&mut conn, &format!("following:{id}")).await;
        let posts = Self::id_list(&mut conn, &format!("posts:{id}")).await;

        Ok(Some(User {
            id: id.to_string(),
            username: fields.get("username").cloned().unwrap_or_default(),
            password: fields.get("password").cloned().unwrap_or_default(),
            followers,
            following,
            posts,
        }))
    }

    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, StoreError> {
        let mut conn = self.conn.clone();
        let post_ids: Vec<String> = conn.lrange(format!("posts:{user_id}"), 0, -1).await?;

        let mut posts = Vec::with_capacity(post_ids.len());
        for post_id in post_ids {
            let fields: HashMap<String, String> =
                conn.hgetall(format!("post:{post_id}")).await?;
            if fields.is_empty() {
                // dangling id in the posts list
                continue;
            }
            posts.push(Post {
                id: post_id,
                user_id: user_id.to_string(),
                content: fields.get("content").cloned().unwrap_or_default(),
                created_at: parse_created_at(fields.get("created_at").map(String::as_str)),
            });
        }
        Ok(posts)
    }
}

fn parse_created_at(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Hash-map-backed store for tests. Sources can be marked as failing to
/// exercise the assembler's best-effort merge.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: HashMap<String, User>,
    posts: HashMap<String, Vec<Post>>,
    failing: std::collections::HashSet<String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn add_user(&mut self, id: &str, following: &[&str]) {
        self.users.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                username: id.to_string(),
                password: String::new(),
                followers: Vec::new(),
                following: following.iter().map(|s| s.to_string()).collect(),
                posts: Vec::new(),
            },
        );
    }

    pub fn add_post(&mut self, user_id: &str, post_id: &str, created_at: DateTime<Utc>) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.posts.push(post_id.to_string());
        }
        self.posts.entry(user_id.to_string()).or_default().push(Post {
            id: post_id.to_string(),
            user_id: user_id.to_string(),
            content: format!("post {post_id}"),
            created_at,
        });
    }

    pub fn fail_posts_for(&mut self, user_id: &str) {
        self.failing.insert(user_id.to_string());
    }
}

#[cfg(test)]
#[async_trait]
impl FeedStore for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).cloned())
    }

    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, StoreError> {
        if self.failing.contains(user_id) {
            return Err(StoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "simulated source outage",
            ))));
        }
        Ok(self.posts.get(user_id).cloned().unwrap_or_default())
    }
}
