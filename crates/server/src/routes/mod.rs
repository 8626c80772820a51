use axum::{Router, response::Json as ResponseJson, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utils::response::ApiResponse;

use crate::AppState;

pub mod projects;
pub mod tasks;

async fn health() -> ResponseJson<ApiResponse<&'static str>> {
    ResponseJson(ApiResponse::success("ok"))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(projects::router())
        .merge(tasks::router())
        .route("/health", get(health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
