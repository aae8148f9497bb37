use aide::OperationIo;
use axum_error_handler::AxumErrorResponse;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::FeedError;

/// A member of the social graph. `password` is opaque credential material
/// carried through from the store, never inspected here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub posts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, AxumErrorResponse, OperationIo)]
pub enum CommonError {
    #[error("{0}")]
    #[status_code("404")]
    UserNotFound(#[from] FeedError),
}
