use std::env;
use std::sync::Arc;

use axum::extract::FromRef;
use thiserror::Error;

use crate::store::{FeedStore, RedisStore, StoreError};

pub type Store = Arc<dyn FeedStore>;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl FromRef<AppState> for Store {
    fn from_ref(input: &AppState) -> Self {
        input.store.clone()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("store connection error: {0}")]
    StoreError(#[from] StoreError),
}

impl AppState {
    pub async fn new() -> Result<Self, Error> {
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        tracing::info!(%redis_url, "connecting to redis");
        let store = RedisStore::connect(&redis_url).await?;

        Ok(Self {
            store: Arc::new(store),
        })
    }
}
