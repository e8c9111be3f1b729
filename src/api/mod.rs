use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::client::SearchBackend;

pub mod handlers;
pub mod models;

pub struct ApiState<B> {
    pub backend: B,
    pub placeholder: String,
    pub initial_query: String,
}

pub fn create_router<B>(state: Arc<ApiState<B>>) -> Router
where
    B: SearchBackend + 'static,
{
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::page_handler::<B>))
        .route("/api/results", get(handlers::results_handler::<B>))
        .with_state(state)
        .layer(cors)
}
