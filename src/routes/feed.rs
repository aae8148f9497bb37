use aide::axum::{
    routing::get_with,
    ApiRouter,
};
use axum::extract::{Path, State};
use axum::Json;
use axum_macros::debug_handler;

use crate::{
    app_state::AppState,
    feed::build_feed,
    shared_types::{CommonError, Post},
};

pub fn routes() -> ApiRouter<AppState> {
    ApiRouter::new().api_route(
        "/:user_id",
        get_with(feed, |t| t.response::<200, Json<Vec<Post>>>()),
    )
}

#[debug_handler]
async fn feed(
    State(AppState { store }): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Post>>, CommonError> {
    let feed = build_feed(store.as_ref(), &user_id).await?;
    Ok(Json(feed))
}
