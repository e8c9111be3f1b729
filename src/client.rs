use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::data_models::{SearchResult, WireRecord};
use crate::error::SearchError;

/// Anything that can answer a query with a list of results.
///
/// Implementations must resolve to [`SearchError::Cancelled`] promptly once
/// `cancel` fires.
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;
}

/// Turns a raw response body into typed results.
pub fn decode_results(body: &[u8], view_base_url: &str) -> Result<Vec<SearchResult>, SearchError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Array(items) = value else {
        return Err(SearchError::NotAList);
    };

    items
        .into_iter()
        .map(|item| -> Result<SearchResult, SearchError> {
            let record: WireRecord = serde_json::from_value(item)?;
            Ok(record.into_result(view_base_url))
        })
        .collect()
}

pub struct HttpSearchClient {
    client: reqwest::Client,
    endpoint: String,
    view_base_url: String,
}

impl HttpSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        view_base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            view_base_url: view_base_url.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let res = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body = res.bytes().await?;
        let results = decode_results(&body, &self.view_base_url)?;
        log::debug!("query {query:?} returned {} results", results.len());
        Ok(results)
    }
}

impl SearchBackend for HttpSearchClient {
    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            res = self.fetch(query) => res,
        }
    }
}
