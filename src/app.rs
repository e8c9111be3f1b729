use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use crate::client::SearchBackend;
use crate::config::Config;
use crate::render::{self, PAGE_TITLE, PageView};
use crate::search_box::SearchBox;
use crate::trigger::{SearchSnapshot, SearchTrigger};

pub struct AppOptions {
    pub placeholder: String,
    pub initial_query: String,
    pub delay: Duration,
}

impl From<&Config> for AppOptions {
    fn from(config: &Config) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            initial_query: config.initial_query.clone(),
            delay: config.debounce,
        }
    }
}

/// The whole page: a search box wired to a debounced trigger, and the
/// results it produces.
pub struct App<B> {
    search_box: SearchBox,
    trigger: SearchTrigger<B>,
    query_rx: mpsc::UnboundedReceiver<String>,
}

impl<B> App<B>
where
    B: SearchBackend + 'static,
{
    /// Mounts the page. The initial query is armed right away, like any
    /// other edit. Must be called from within a tokio runtime.
    pub fn new(backend: B, options: AppOptions) -> Self {
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let search_box = SearchBox::new(
            options.placeholder,
            options.initial_query.clone(),
            Box::new(move |q: &str| {
                // Receiver lives as long as the app; a failed send means teardown.
                let _ = query_tx.send(q.to_string());
            }),
        );

        let mut trigger = SearchTrigger::new(backend, options.delay);
        trigger.set_query(options.initial_query);

        Self {
            search_box,
            trigger,
            query_rx,
        }
    }

    pub fn input(&mut self, value: impl Into<String>) {
        self.search_box.input(value);
        while let Ok(query) = self.query_rx.try_recv() {
            self.trigger.set_query(query);
        }
    }
}

impl<B> App<B> {
    pub fn query(&self) -> &str {
        self.search_box.value()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.trigger.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.trigger.subscribe()
    }

    /// Tears down pending work; the app stays usable.
    pub fn cancel(&mut self) {
        self.trigger.cancel();
    }

    pub fn render(&self) -> Result<String> {
        let snapshot = self.trigger.snapshot();
        render::render_page(&PageView {
            title: PAGE_TITLE,
            placeholder: self.search_box.placeholder(),
            value: self.search_box.value(),
            searching: snapshot.searching,
            results: &snapshot.results,
        })
    }
}
