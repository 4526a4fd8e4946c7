//! Debounced product search.
//!
//! Every call to [`SearchDebouncer::schedule`] cancels the pending search and
//! starts a new quiet period. Only when no input arrives for the whole period
//! is the fetch issued. Fetches for the same debouncer are serialized by a
//! lock, and a search that is superseded while in flight is aborted before
//! it can publish its result.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use khushiv_core::Product;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ProductQuery;
use crate::api::ApiError;

type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<Product>, ApiError>> + Send>>;
type Fetcher = Arc<dyn Fn(ProductQuery) -> FetchFuture + Send + Sync>;

/// Latest state of the search stream.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Query the state belongs to; `None` before the first search.
    pub query: Option<ProductQuery>,
    /// Whether a fetch for `query` is running.
    pub loading: bool,
    /// Products returned by the last completed fetch.
    pub products: Vec<Product>,
    /// Message from the last failed fetch.
    pub error: Option<String>,
    /// Number of completed fetches.
    pub completed: u64,
}

/// Cancellable-timer wrapper around a product fetch.
///
/// Must be used from within a Tokio runtime.
pub struct SearchDebouncer {
    quiet: Duration,
    fetch: Fetcher,
    pending: Mutex<Option<JoinHandle<()>>>,
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
    state: Arc<watch::Sender<SearchState>>,
}

impl SearchDebouncer {
    /// Create a debouncer that waits `quiet` after the last input before
    /// calling `fetch`.
    pub fn new<F, Fut>(quiet: Duration, fetch: F) -> Self
    where
        F: Fn(ProductQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Product>, ApiError>> + Send + 'static,
    {
        let fetch: Fetcher = Arc::new(move |query| Box::pin(fetch(query)));
        let (state, _) = watch::channel(SearchState::default());
        Self {
            quiet,
            fetch,
            pending: Mutex::new(None),
            fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
            state: Arc::new(state),
        }
    }

    /// Subscribe to search state updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Current search state.
    #[must_use]
    pub fn current(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Schedule a search for `query`, replacing any pending one.
    pub fn schedule(&self, query: ProductQuery) {
        let quiet = self.quiet;
        let fetch = Arc::clone(&self.fetch);
        let fetch_lock = Arc::clone(&self.fetch_lock);
        let state = Arc::clone(&self.state);

        let mut pending = self.pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _guard = fetch_lock.lock().await;

            debug!(keyword = %query.keyword, "Running debounced search");
            state.send_modify(|s| {
                s.query = Some(query.clone());
                s.loading = true;
            });

            let result = fetch(query).await;

            state.send_modify(|s| {
                s.loading = false;
                s.completed += 1;
                match result {
                    Ok(products) => {
                        s.products = products;
                        s.error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "Product search failed");
                        s.error = Some(e.user_message());
                    }
                }
            });
        }));
    }

    /// Cancel the pending search, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending().take() {
            handle.abort();
        }
        self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }

    /// Wait until the most recently scheduled search has finished.
    pub async fn settle(&self) {
        let handle = self.pending().take();
        if let Some(handle) = handle {
            // An aborted task reports a cancellation error; nothing to surface.
            let _ = handle.await;
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use khushiv_core::{Price, ProductId};

    use super::*;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(name),
            name: name.to_string(),
            price: Price::from_cents(100),
            image: String::new(),
            description: String::new(),
            brand: String::new(),
            category: String::new(),
            count_in_stock: 1,
            rating: 0.0,
            num_reviews: 0,
        }
    }

    fn recording_debouncer(
        quiet: Duration,
    ) -> (SearchDebouncer, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let debouncer = {
            let seen = Arc::clone(&seen);
            let calls = Arc::clone(&calls);
            SearchDebouncer::new(quiet, move |query: ProductQuery| {
                let seen = Arc::clone(&seen);
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    seen.lock().unwrap().push(query.keyword.clone());
                    Ok::<_, ApiError>(vec![product(&query.keyword)])
                }
            })
        };
        (debouncer, seen, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_input_runs_one_fetch() {
        let (debouncer, seen, calls) = recording_debouncer(Duration::from_millis(500));

        for keyword in ["s", "sa", "sar", "saree"] {
            debouncer.schedule(ProductQuery::keyword(keyword));
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        debouncer.settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["saree".to_string()]);

        let state = debouncer.current();
        assert!(!state.loading);
        assert_eq!(state.completed, 1);
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.query.unwrap().keyword, "saree");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_pauses_run_separate_fetches() {
        let (debouncer, seen, _) = recording_debouncer(Duration::from_millis(500));

        debouncer.schedule(ProductQuery::keyword("kurta"));
        debouncer.settle().await;
        debouncer.schedule(ProductQuery::keyword("saree"));
        debouncer.settle().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["kurta".to_string(), "saree".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fetch() {
        let (debouncer, _, calls) = recording_debouncer(Duration::from_millis(500));

        debouncer.schedule(ProductQuery::keyword("kurta"));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(debouncer.current().completed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_publishes_message() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(10), |_query| async {
            Err::<Vec<Product>, _>(ApiError::Rejected {
                status: 500,
                message: Some("Server exploded".to_string()),
            })
        });
        let mut rx = debouncer.subscribe();

        debouncer.schedule(ProductQuery::default());
        debouncer.settle().await;

        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert_eq!(state.error.as_deref(), Some("Server exploded"));
        assert!(state.products.is_empty());
    }
}
