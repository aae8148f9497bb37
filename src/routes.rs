use aide::axum::routing::get_with;
use aide::axum::ApiRouter;

use crate::app_state::AppState;

mod feed;

pub fn routes() -> ApiRouter<AppState> {
    ApiRouter::new()
        .api_route("/health", get_with(health, |t| t.response::<200, String>()))
        .nest("/feed", feed::routes())
}

async fn health() -> String {
    "OK".to_string()
}
