use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::SearchBackend;
use crate::data_models::SearchResult;

/// Debounced, single-flight search trigger.
///
/// ```text
///     Idle --set_query--> Armed --delay elapsed--> InFlight --settled--> Idle
///     Armed | InFlight --set_query--> Armed (previous work cancelled)
///     any --cancel / drop--> Idle
/// ```
///
/// Every query change bumps a generation number. A task only commits while
/// its generation is still current, and the check happens inside the watch
/// channel's write lock, so a late response can never overwrite results
/// for a newer query.
pub struct SearchTrigger<B> {
    backend: Arc<B>,
    delay: Duration,
    state_tx: Arc<watch::Sender<SearchSnapshot>>,
    pending: Option<PendingSearch>,
}

struct PendingSearch {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    Idle,
    Armed,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub searching: bool,
    pub phase: TriggerPhase,
    pub generation: u64,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            searching: false,
            phase: TriggerPhase::Idle,
            generation: 0,
        }
    }
}

impl<B> SearchTrigger<B>
where
    B: SearchBackend + 'static,
{
    pub fn new(backend: B, delay: Duration) -> Self {
        Self::with_backend(Arc::new(backend), delay)
    }

    pub fn with_backend(backend: Arc<B>, delay: Duration) -> Self {
        let (state_tx, _) = watch::channel(SearchSnapshot::default());
        Self {
            backend,
            delay,
            state_tx: Arc::new(state_tx),
            pending: None,
        }
    }

    /// Supersedes whatever is pending and arms a fresh timer for `query`.
    /// Must be called from within a tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.abandon_pending();

        let mut generation = 0;
        self.state_tx.send_modify(|s| {
            s.generation += 1;
            s.query = query.clone();
            s.searching = false;
            s.phase = TriggerPhase::Armed;
            generation = s.generation;
        });

        let cancel = CancellationToken::new();
        let deadline = Instant::now() + self.delay;
        let handle = tokio::spawn(run_search(
            self.backend.clone(),
            self.state_tx.clone(),
            cancel.clone(),
            generation,
            query,
            deadline,
        ));
        self.pending = Some(PendingSearch { cancel, handle });
    }
}

impl<B> SearchTrigger<B> {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Drops any armed timer or in-flight request. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if !self.abandon_pending() {
            return;
        }
        self.state_tx.send_if_modified(|s| {
            if s.phase == TriggerPhase::Idle {
                return false;
            }
            s.generation += 1;
            s.searching = false;
            s.phase = TriggerPhase::Idle;
            true
        });
    }

    fn abandon_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.cancel.cancel();
                // Backends are free to ignore the token.
                pending.handle.abort();
                true
            }
            None => false,
        }
    }
}

impl<B> Drop for SearchTrigger<B> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Settles a request that ended without committing, e.g. a panicking
/// backend. No-op once the request committed or was superseded.
struct InFlightGuard<'a> {
    state_tx: &'a watch::Sender<SearchSnapshot>,
    generation: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        let cleared = self.state_tx.send_if_modified(|s| {
            if s.generation != generation || s.phase != TriggerPhase::InFlight {
                return false;
            }
            s.searching = false;
            s.phase = TriggerPhase::Idle;
            true
        });
        if cleared {
            log::error!("search task for generation {generation} ended without settling");
        }
    }
}

async fn run_search<B: SearchBackend>(
    backend: Arc<B>,
    state_tx: Arc<watch::Sender<SearchSnapshot>>,
    cancel: CancellationToken,
    generation: u64,
    query: String,
    deadline: Instant,
) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            log::trace!("debounce timer for {query:?} superseded");
            return;
        }
        _ = tokio::time::sleep_until(deadline) => {}
    }

    let dispatched = state_tx.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.phase = TriggerPhase::InFlight;
        s.searching = true;
        true
    });
    if !dispatched {
        return;
    }

    log::info!("searching for {query:?}");
    let _guard = InFlightGuard {
        state_tx: &state_tx,
        generation,
    };
    let outcome = backend.search(&query, &cancel).await;

    match outcome {
        Err(e) if e.is_cancelled() => {
            // Whoever cancelled us already settled the flag.
            log::debug!("search for {query:?} cancelled");
        }
        outcome => {
            state_tx.send_if_modified(|s| {
                if s.generation != generation {
                    log::debug!("dropping stale response for {query:?}");
                    return false;
                }
                match outcome {
                    Ok(results) => {
                        log::info!("search for {query:?} settled with {} results", results.len());
                        s.results = results;
                    }
                    Err(e) => {
                        log::warn!("search for {query:?} failed: {e:#}");
                    }
                }
                s.searching = false;
                s.phase = TriggerPhase::Idle;
                true
            });
        }
    }
}
