use anyhow::Result;
use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use snapsearch::client::{HttpSearchClient, SearchBackend};
use snapsearch::error::SearchError;
use snapsearch::render::render_results;
use snapsearch::trigger::{SearchTrigger, TriggerPhase};

mod test_helpers {
    use super::*;

    pub const VIEW_BASE: &str = "http://localhost:4000/view";

    /// Serves `router` on an ephemeral port and returns the search URL.
    pub async fn spawn_upstream(router: Router) -> Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Ok(format!("http://{addr}/search"))
    }

    pub fn client_for(endpoint: String) -> Result<HttpSearchClient> {
        Ok(HttpSearchClient::new(
            endpoint,
            VIEW_BASE,
            Duration::from_secs(5),
        )?)
    }

    pub fn fixed(body: Value) -> Router {
        Router::new().route(
            "/search",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        )
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_single_result_renders_one_link() -> Result<()> {
    let endpoint = spawn_upstream(fixed(json!([{"imageUrl": "a", "thumbnailUrl": "b"}]))).await?;
    let client = client_for(endpoint)?;

    let results = client.search("dog", &CancellationToken::new()).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].image_url, "a");
    assert_eq!(results[0].thumbnail_url, "b");

    let html = render_results(&results)?;
    assert_eq!(html.matches("<a ").count(), 1);
    assert!(html.contains(r#"href="a""#));
    Ok(())
}

#[tokio::test]
async fn test_query_parameter_and_file_records() -> Result<()> {
    let router = Router::new().route(
        "/search",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let query = params.get("query").cloned().unwrap_or_default();
            Json(json!([{ "fileName": format!("/{query}.jpg") }]))
        }),
    );
    let client = client_for(spawn_upstream(router).await?)?;

    let results = client
        .search("hot dog", &CancellationToken::new())
        .await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].image_url, format!("{VIEW_BASE}/hot dog.jpg"));
    assert_eq!(results[0].thumbnail_url, results[0].image_url);
    Ok(())
}

#[tokio::test]
async fn test_server_error_maps_to_status() -> Result<()> {
    let router = Router::new().route(
        "/search",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "index unavailable") }),
    );
    let client = client_for(spawn_upstream(router).await?)?;

    let err = client
        .search("dog", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, SearchError::Status(s) if s == reqwest::StatusCode::INTERNAL_SERVER_ERROR),
        "unexpected error: {err:?}"
    );
    Ok(())
}

#[tokio::test]
async fn test_non_list_payload_rejected() -> Result<()> {
    let endpoint = spawn_upstream(fixed(json!({"results": []}))).await?;
    let client = client_for(endpoint)?;

    let err = client
        .search("dog", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::NotAList), "unexpected error: {err:?}");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = client_for(format!("http://{addr}/search"))?;
    let err = client
        .search("dog", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)), "unexpected error: {err:?}");
    assert!(!err.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_cancel_aborts_slow_request() -> Result<()> {
    let router = Router::new().route(
        "/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(json!([]))
        }),
    );
    let client = client_for(spawn_upstream(router).await?)?;

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = client.search("dog", &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn test_trigger_over_http() -> Result<()> {
    let endpoint = spawn_upstream(fixed(json!([
        {"imageUrl": "full", "thumbnailUrl": "thumb", "content": "a dog on a beach"}
    ])))
    .await?;
    let mut trigger = SearchTrigger::new(client_for(endpoint)?, Duration::from_millis(20));
    let mut rx = trigger.subscribe();

    trigger.set_query("dog");
    let settled = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.phase == TriggerPhase::Idle && !s.results.is_empty()),
    )
    .await??
    .clone();

    assert!(!settled.searching);
    assert_eq!(settled.results[0].content.as_deref(), Some("a dog on a beach"));
    Ok(())
}
