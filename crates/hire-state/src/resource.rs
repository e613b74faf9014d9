//! Generic paginated list container.
//!
//! Owns `{items, loading, error, pagination, filters}` for one list view.
//! Every fetch takes a generation number; only the latest generation may
//! write, so a slow response can never overwrite a newer one. `close()`
//! cancels in-flight calls and freezes the state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use hire_client::{ClientError, ClientResult};
use hire_models::filters::PAGE_KEY;
use hire_models::pagination::DEFAULT_PAGE_SIZE;
use hire_models::{Page, Pagination, QueryFilters};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::access::RoleGate;
use crate::notify::Notifier;

/// Anything that can produce one page of a list.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    /// Short label for logs.
    fn name(&self) -> &'static str;

    async fn fetch_page(&self, filters: &QueryFilters) -> ClientResult<Page<Self::Item>>;
}

/// What a fetched page does to the items already held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageMode {
    /// Each page replaces the list.
    #[default]
    Replace,
    /// Pages after the first are appended (infinite scroll).
    Append,
}

#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
    pub filters: QueryFilters,
}

impl<T> ResourceState<T> {
    fn new(filters: QueryFilters) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            pagination: Pagination::default(),
            filters,
        }
    }
}

/// Result of one `fetch` / `load_more` / `refresh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// State now holds the page.
    Loaded { count: usize },
    /// The call failed; the message is in `error` and was notified.
    Failed(String),
    /// A newer fetch started before this one finished; result dropped.
    Superseded,
    /// The user's role may not read this resource; no call was made.
    Forbidden,
    /// `load_more` with no next page; no call was made.
    NoMorePages,
    /// The container was closed.
    Closed,
}

pub struct PaginatedResource<S: PageSource> {
    source: S,
    notifier: Arc<dyn Notifier>,
    gate: RoleGate,
    mode: PageMode,
    cancel: CancellationToken,
    generation: AtomicU64,
    state: Mutex<ResourceState<S::Item>>,
}

impl<S: PageSource> PaginatedResource<S> {
    pub fn new(source: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            gate: RoleGate::open(),
            mode: PageMode::default(),
            cancel: CancellationToken::new(),
            generation: AtomicU64::new(0),
            state: Mutex::new(ResourceState::new(QueryFilters::page(1, DEFAULT_PAGE_SIZE))),
        }
    }

    pub fn with_gate(mut self, gate: RoleGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_mode(mut self, mode: PageMode) -> Self {
        self.mode = mode;
        self
    }

    /// Filters the first fetch merges over.
    pub fn with_filters(self, filters: QueryFilters) -> Self {
        self.lock().filters = filters;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn snapshot(&self) -> ResourceState<S::Item> {
        self.lock().clone()
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.lock().items.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn pagination(&self) -> Pagination {
        self.lock().pagination
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fetch with `filters` merged over the last-used ones.
    pub async fn fetch(&self, filters: &QueryFilters) -> FetchOutcome {
        let merged = self.lock().filters.merged(filters);
        self.run(merged).await
    }

    /// Start a new search: `filters` replace the last-used ones and the page
    /// goes back to 1. The page size carries over unless `filters` set one.
    pub async fn search(&self, filters: &QueryFilters) -> FetchOutcome {
        let limit = self.lock().filters.limit().unwrap_or(DEFAULT_PAGE_SIZE);
        self.run(QueryFilters::page(1, limit).merged(filters)).await
    }

    /// Fetch the next page, or do nothing when there is none.
    pub async fn load_more(&self) -> FetchOutcome {
        let pagination = self.pagination();
        let Some(next) = pagination.next_page() else {
            return FetchOutcome::NoMorePages;
        };
        self.fetch(&QueryFilters::new().with(PAGE_KEY, next)).await
    }

    /// Re-run the last-used filters. In append mode the list restarts from
    /// the first page, since the held items span every page loaded so far.
    pub async fn refresh(&self) -> FetchOutcome {
        match self.mode {
            PageMode::Replace => self.fetch(&QueryFilters::new()).await,
            PageMode::Append => self.fetch(&QueryFilters::new().with(PAGE_KEY, 1)).await,
        }
    }

    async fn run(&self, filters: QueryFilters) -> FetchOutcome {
        if self.is_closed() {
            return FetchOutcome::Closed;
        }
        if !self.gate.permits() {
            debug!(resource = self.source.name(), "Role not allowed, skipping fetch");
            // Drop anything loaded under an earlier session and any fetch
            // still in flight for it.
            self.generation.fetch_add(1, Ordering::SeqCst);
            let mut state = self.lock();
            state.items.clear();
            state.pagination = Pagination::default();
            state.loading = false;
            state.error = None;
            return FetchOutcome::Forbidden;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        debug!(
            resource = self.source.name(),
            generation,
            query = %filters.to_query_string(),
            "Fetching page"
        );

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.source.fetch_page(&filters) => result,
        };

        if self.is_closed() {
            self.lock().loading = false;
            return FetchOutcome::Closed;
        }

        let mut state = self.lock();
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!(resource = self.source.name(), generation, "Discarding superseded page");
            return FetchOutcome::Superseded;
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let count = page.items.len();
                // Only the page right after the last one held extends the
                // list; anything else replaces it.
                let append = self.mode == PageMode::Append
                    && page.pagination.current_page > 1
                    && page.pagination.current_page == state.pagination.current_page + 1;
                if append {
                    state.items.extend(page.items);
                } else {
                    state.items = page.items;
                }
                state.pagination = page.pagination;
                state.filters = filters;
                FetchOutcome::Loaded { count }
            }
            Err(ClientError::Cancelled) => FetchOutcome::Closed,
            Err(e) => {
                let message = e.user_message();
                warn!(resource = self.source.name(), "Fetch failed: {}", e);
                state.error = Some(message.clone());
                drop(state);
                self.notifier.error(&message);
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Cancel in-flight calls; later fetches are no-ops.
    pub fn close(&self) {
        self.cancel.cancel();
        debug!(resource = self.source.name(), "Closed");
    }

    fn lock(&self) -> MutexGuard<'_, ResourceState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: PageSource> Drop for PaginatedResource<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationLog;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Serves `total` numbered items; pages listed in `slow_pages` sleep.
    struct Numbers {
        total: u32,
        calls: AtomicUsize,
        slow_pages: Vec<u32>,
        fail: bool,
    }

    impl Numbers {
        fn new(total: u32) -> Self {
            Self {
                total,
                calls: AtomicUsize::new(0),
                slow_pages: Vec::new(),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PageSource for Numbers {
        type Item = u32;

        fn name(&self) -> &'static str {
            "numbers"
        }

        async fn fetch_page(&self, filters: &QueryFilters) -> ClientResult<Page<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let page = filters.current_page().unwrap_or(1);
            let limit = filters.limit().unwrap_or(DEFAULT_PAGE_SIZE);
            if self.slow_pages.contains(&page) {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            if self.fail {
                return Err(ClientError::Server(500));
            }
            let start = (page - 1) * limit;
            let items = (start..self.total.min(start + limit)).collect();
            Ok(Page::new(
                items,
                Pagination::from_counts(page, limit, self.total as u64),
            ))
        }
    }

    #[tokio::test]
    async fn test_fetch_then_load_more_until_exhausted() {
        let resource = PaginatedResource::new(Numbers::new(15), Arc::new(NotificationLog::new()));

        assert_eq!(
            resource.fetch(&QueryFilters::new()).await,
            FetchOutcome::Loaded { count: 10 }
        );
        assert!(resource.pagination().has_next_page);

        assert_eq!(resource.load_more().await, FetchOutcome::Loaded { count: 5 });
        assert_eq!(resource.items(), (10..15).collect::<Vec<_>>());
        assert_eq!(resource.snapshot().filters.current_page(), Some(2));

        assert_eq!(resource.load_more().await, FetchOutcome::NoMorePages);
        assert_eq!(resource.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_append_mode_accumulates() {
        let resource = PaginatedResource::new(Numbers::new(15), Arc::new(NotificationLog::new()))
            .with_mode(PageMode::Append);

        resource.fetch(&QueryFilters::new()).await;
        resource.load_more().await;
        assert_eq!(resource.items(), (0..15).collect::<Vec<_>>());

        resource.fetch(&QueryFilters::new().with("page", 1)).await;
        assert_eq!(resource.items().len(), 10);
    }

    #[tokio::test]
    async fn test_append_mode_refresh_does_not_duplicate() {
        let resource = PaginatedResource::new(Numbers::new(15), Arc::new(NotificationLog::new()))
            .with_mode(PageMode::Append);

        resource.fetch(&QueryFilters::new()).await;
        resource.load_more().await;
        assert_eq!(resource.refresh().await, FetchOutcome::Loaded { count: 10 });
        assert_eq!(resource.items(), (0..10).collect::<Vec<_>>());

        resource.load_more().await;
        resource.fetch(&QueryFilters::new().with("page", 2)).await;
        assert_eq!(resource.items(), (10..15).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_search_resets_page_and_keeps_limit() {
        let resource = PaginatedResource::new(Numbers::new(40), Arc::new(NotificationLog::new()));

        resource
            .fetch(&QueryFilters::page(2, 5).with("search", "acme"))
            .await;
        assert_eq!(resource.items(), (5..10).collect::<Vec<_>>());

        resource.search(&QueryFilters::new().with("status", "active")).await;

        let filters = resource.snapshot().filters;
        assert_eq!(filters.current_page(), Some(1));
        assert_eq!(filters.limit(), Some(5));
        assert_eq!(filters.get("status"), Some("active"));
        assert!(filters.get("search").is_none());
        assert_eq!(resource.items(), (0..5).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_notifies() {
        let log = Arc::new(NotificationLog::new());
        let mut source = Numbers::new(5);
        source.fail = true;
        let resource = PaginatedResource::new(source, log.clone());

        let outcome = resource.fetch(&QueryFilters::new()).await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert!(!resource.is_loading());
        assert_eq!(
            resource.error().as_deref(),
            Some(hire_client::SERVER_ERROR_MESSAGE)
        );
        assert_eq!(log.messages(crate::notify::Level::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_slow_older_fetch_is_discarded() {
        let mut source = Numbers::new(30);
        source.slow_pages = vec![1];
        let resource = Arc::new(PaginatedResource::new(source, Arc::new(NotificationLog::new())));

        let slow = {
            let resource = Arc::clone(&resource);
            tokio::spawn(async move { resource.fetch(&QueryFilters::new().with("page", 1)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = resource.fetch(&QueryFilters::new().with("page", 2)).await;

        assert_eq!(fast, FetchOutcome::Loaded { count: 10 });
        assert_eq!(slow.await.unwrap(), FetchOutcome::Superseded);
        assert_eq!(resource.items(), (10..20).collect::<Vec<_>>());
        assert!(!resource.is_loading());
    }

    #[tokio::test]
    async fn test_close_cancels_in_flight_fetch() {
        let mut source = Numbers::new(30);
        source.slow_pages = vec![1];
        let resource = Arc::new(PaginatedResource::new(source, Arc::new(NotificationLog::new())));

        let pending = {
            let resource = Arc::clone(&resource);
            tokio::spawn(async move { resource.fetch(&QueryFilters::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        resource.close();

        assert_eq!(pending.await.unwrap(), FetchOutcome::Closed);
        assert!(resource.items().is_empty());
        assert_eq!(resource.refresh().await, FetchOutcome::Closed);
    }

    #[tokio::test]
    async fn test_gate_without_session_blocks() {
        let resource = PaginatedResource::new(Numbers::new(5), Arc::new(NotificationLog::new()))
            .with_gate(RoleGate {
                session: None,
                allowed: Some(vec![hire_models::Role::Recruiter]),
            });

        assert_eq!(resource.fetch(&QueryFilters::new()).await, FetchOutcome::Forbidden);
        assert_eq!(resource.source().calls.load(Ordering::SeqCst), 0);
        assert!(resource.items().is_empty());
    }
}
