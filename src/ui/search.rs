//! Debounced word search for UI surfaces
//!
//! Typing calls [`SearchController::set_query`], which restarts a debounce
//! timer. Only when the timer runs out is a `GET_WORDS` request issued. Each
//! issued search takes a fresh id; a response is applied only if its id is
//! still the latest, so a slow old search can never replace newer results.
//!
//! For a non-empty query a second, unfiltered `GET_WORDS` runs after the
//! first to report the total word count next to the match count.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::RequestSequence;
use crate::protocol::{GetWords, MessageClient, Response};
use crate::words::WordRecord;

/// Quiet period after the last keystroke before a search is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// What the search UI displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    pub query: String,
    /// Matches, newest first
    pub results: Vec<WordRecord>,
    pub match_count: usize,
    pub total_count: usize,
    pub loading: bool,
    /// User-visible message from the last failed search
    pub error: Option<String>,
}

struct Shared {
    client: MessageClient,
    sequence: RequestSequence,
    view: Mutex<SearchView>,
}

impl Shared {
    fn view(&self) -> MutexGuard<'_, SearchView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the next request id. Call when the search is issued, not from
    /// its task: spawned tasks may start in any order.
    fn begin(&self) -> u64 {
        let request_id = self.sequence.next();
        self.view().loading = true;
        request_id
    }

    /// Run one search and apply its result if it is still the latest
    async fn run(&self, query: String, request_id: u64) {
        let filter = Some(query.trim().to_string()).filter(|q| !q.is_empty());
        let response = match &filter {
            Some(q) => self.client.send(GetWords::matching(q.clone())).await,
            None => self.client.send(GetWords::all()).await,
        };

        if !self.sequence.is_current(request_id) {
            log::debug!("Discarding stale search #{} for '{}'", request_id, query);
            return;
        }

        let mut results = match response {
            Response::Success(words) => words,
            Response::Failure(error) => {
                log::warn!("Search for '{}' failed: {}", query, error);
                let mut view = self.view();
                view.results.clear();
                view.match_count = 0;
                view.total_count = 0;
                view.loading = false;
                view.error = Some(error.message);
                return;
            }
        };
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let match_count = results.len();

        let total_count = if filter.is_some() {
            let total = self.client.send(GetWords::all()).await;
            if !self.sequence.is_current(request_id) {
                log::debug!("Discarding stale total for search #{}", request_id);
                return;
            }
            match total {
                Response::Success(all) => all.len(),
                Response::Failure(error) => {
                    log::warn!("Fetching total word count failed: {}", error);
                    match_count
                }
            }
        } else {
            match_count
        };

        let mut view = self.view();
        view.results = results;
        view.match_count = match_count;
        view.total_count = total_count;
        view.loading = false;
        view.error = None;
    }
}

/// Search state for one UI surface. Must be used inside a tokio runtime.
pub struct SearchController {
    shared: Arc<Shared>,
    debounce: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    pub fn new(client: MessageClient, debounce: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                sequence: RequestSequence::new(),
                view: Mutex::new(SearchView::default()),
            }),
            debounce,
            timer: Mutex::new(None),
        }
    }

    /// Snapshot of the current view
    pub fn view(&self) -> SearchView {
        self.shared.view().clone()
    }

    /// Record a keystroke. The search runs once input has been quiet for the
    /// debounce period.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.shared.view().query = query.clone();

        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let request_id = shared.begin();
            // Detach the search so cancelling the timer never cancels a
            // request that is already in flight
            tokio::spawn(async move { shared.run(query, request_id).await });
        });

        if let Some(previous) = self.lock_timer().replace(timer) {
            previous.abort();
        }
    }

    /// Reset the query and search immediately, skipping the debounce
    pub fn clear(&self) -> JoinHandle<()> {
        self.cancel_pending();
        self.shared.view().query.clear();
        self.spawn_run(String::new())
    }

    /// Search the current query immediately
    pub fn search_now(&self) -> JoinHandle<()> {
        self.cancel_pending();
        let query = self.shared.view().query.clone();
        self.spawn_run(query)
    }

    /// Cancel a debounce timer that has not fired yet
    pub fn cancel_pending(&self) {
        if let Some(timer) = self.lock_timer().take() {
            timer.abort();
        }
    }

    fn spawn_run(&self, query: String) -> JoinHandle<()> {
        let request_id = self.shared.begin();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.run(query, request_id).await })
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
