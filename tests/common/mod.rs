#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use snapsearch::client::SearchBackend;
use snapsearch::data_models::SearchResult;
use snapsearch::error::SearchError;

#[derive(Clone)]
pub enum Reply {
    Hits(Vec<SearchResult>),
    Fail,
    Panic,
}

/// Scripted backend: per-query replies and latencies, and a log of every
/// call with the (possibly paused) clock reading at dispatch.
#[derive(Clone, Default)]
pub struct MockBackend {
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    latencies: Arc<Mutex<HashMap<String, Duration>>>,
    active: Arc<AtomicUsize>,
    peak_active: Arc<AtomicUsize>,
    ignore_cancel: bool,
}

/// Counts a call as active until its future completes or is dropped.
struct ActiveCall(Arc<AtomicUsize>);

impl Drop for ActiveCall {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps running after cancellation, so the response arrives late.
    pub fn ignoring_cancel() -> Self {
        Self {
            ignore_cancel: true,
            ..Self::default()
        }
    }

    pub fn reply(&self, query: &str, reply: Reply) -> &Self {
        self.replies.lock().unwrap().insert(query.to_string(), reply);
        self
    }

    pub fn latency(&self, query: &str, latency: Duration) -> &Self {
        self.latencies
            .lock()
            .unwrap()
            .insert(query.to_string(), latency);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn active_calls(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak_active_calls(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}

impl SearchBackend for MockBackend {
    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), Instant::now()));
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
        let _active = ActiveCall(self.active.clone());

        let latency = self
            .latencies
            .lock()
            .unwrap()
            .get(query)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| Reply::Hits(vec![hit(query)]));

        if self.ignore_cancel {
            tokio::time::sleep(latency).await;
        } else {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                _ = tokio::time::sleep(latency) => {}
            }
        }

        match reply {
            Reply::Hits(hits) => Ok(hits),
            Reply::Fail => Err(SearchError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
            Reply::Panic => panic!("backend blew up on {query:?}"),
        }
    }
}

/// A result whose image is named after the query that found it.
pub fn hit(name: &str) -> SearchResult {
    SearchResult::new(
        format!("{name}.jpg"),
        format!("{name}_thumb.jpg"),
        Some(name.to_string()),
    )
}
