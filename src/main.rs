use aide::axum::routing::get;
use aide::openapi::{Info, OpenApi};

use aide::axum::{ApiRouter, IntoApiResponse};
use aide::scalar::Scalar;
use app_state::AppState;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod app_state;
mod feed;
mod routes;
mod shared_types;
mod store;

async fn serve_api(Extension(api): Extension<OpenApi>) -> impl IntoApiResponse {
    Json(api).into_response()
}

// Write verbs stay allowed for clients even though only reads are served.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("starting application");

    let mut api = OpenApi {
        info: Info {
            description: Some("For You Feed Api v1".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let app = ApiRouter::new()
        .route("/scalar", Scalar::new("/api.json").axum_route())
        .route("/api.json", get(serve_api))
        .merge(routes::routes())
        .with_state(AppState::new().await.expect("could not start appstate"));
    let app = app
        .finish_api(&mut api)
        .layer(Extension(api))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .into_make_service();

    tracing::info!("serving on 0.0.0.0:8080");
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
