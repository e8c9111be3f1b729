use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::SearchBackend;
use crate::data_models::SearchResult;
use crate::render::{self, PAGE_TITLE, PageView};

use super::ApiState;
use super::models::{ResultsResponse, SearchParams};

async fn run_query<B: SearchBackend>(
    state: &ApiState<B>,
    query: &str,
) -> Result<Vec<SearchResult>, (StatusCode, String)> {
    // Dropping the handler future (client gone) drops the request with it.
    let cancel = CancellationToken::new();
    state.backend.search(query, &cancel).await.map_err(|e| {
        log::warn!("search for {query:?} failed: {e:#}");
        (StatusCode::BAD_GATEWAY, format!("Search error: {}", e))
    })
}

/// Server-rendered page for `?query=`, falling back to the initial query.
pub async fn page_handler<B: SearchBackend + 'static>(
    State(state): State<Arc<ApiState<B>>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let query = params
        .query
        .unwrap_or_else(|| state.initial_query.clone());
    let results = run_query(&state, &query).await?;

    let html = render::render_page(&PageView {
        title: PAGE_TITLE,
        placeholder: &state.placeholder,
        value: &query,
        searching: false,
        results: &results,
    })
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Render error: {:#}", e),
        )
    })?;

    Ok(Html(html))
}

pub async fn results_handler<B: SearchBackend + 'static>(
    State(state): State<Arc<ApiState<B>>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ResultsResponse>, (StatusCode, String)> {
    let start = Instant::now();
    let query = params.query.unwrap_or_default();

    let results = run_query(&state, &query).await?;

    let total_results = results.len();
    let processing_time_ms = start.elapsed().as_millis();

    Ok(Json(ResultsResponse {
        query,
        results,
        total_results,
        processing_time_ms,
    }))
}
