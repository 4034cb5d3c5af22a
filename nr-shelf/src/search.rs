//! Debounced header search
//!
//! Every keystroke cancels the lookup scheduled by the previous one; a lookup
//! runs only once the input has been quiet for the debounce delay.

use nr_common::content::gateway::DEFAULT_SEARCH_LIMIT;
use nr_common::models::SearchResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::SearchSource;

pub const DEBOUNCE: Duration = Duration::from_millis(300);

pub struct SearchBox {
    source: Arc<dyn SearchSource>,
    debounce: Duration,
    limit: usize,
    scheduled: Mutex<Option<JoinHandle<()>>>,
    results: Arc<RwLock<Vec<SearchResult>>>,
}

impl SearchBox {
    pub fn new(source: Arc<dyn SearchSource>) -> Self {
        Self {
            source,
            debounce: DEBOUNCE,
            limit: DEFAULT_SEARCH_LIMIT,
            scheduled: Mutex::new(None),
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// New input text. Blank input clears the results at once.
    pub async fn input(&self, text: &str) {
        let mut scheduled = self.scheduled.lock().await;
        if let Some(previous) = scheduled.take() {
            previous.abort();
        }

        let query = text.trim().to_string();
        if query.is_empty() {
            self.results.write().await.clear();
            return;
        }

        let source = Arc::clone(&self.source);
        let results = Arc::clone(&self.results);
        let debounce = self.debounce;
        let limit = self.limit;
        *scheduled = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!(query = %query, "Searching");
            match source.search(&query, limit).await {
                Ok(hits) => *results.write().await = hits,
                Err(e) => {
                    warn!(query = %query, "Search failed: {}", e);
                    results.write().await.clear();
                }
            }
        }));
    }

    pub async fn results(&self) -> Vec<SearchResult> {
        self.results.read().await.clone()
    }

    /// Drop the results and any scheduled lookup (dropdown closed)
    pub async fn clear(&self) {
        if let Some(previous) = self.scheduled.lock().await.take() {
            previous.abort();
        }
        self.results.write().await.clear();
    }
}
