//! Reactive view-model over a [`TaskApi`].
//!
//! The store owns the active [`TaskFilter`] and one [`StoreSnapshot`] of
//! the list for that filter. Every filter change and every successful
//! mutation marks the list stale and refetches it; the server is the only
//! source of truth and nothing is patched locally.
//!
//! Fetches may overlap. Each one takes the next value of a monotonically
//! increasing token and becomes the latest fetch for the active key; a
//! result is applied only if, when it arrives, its key is still active and
//! its token is still the latest. Everything else is dropped, so the
//! visible list is always the answer to the most recently issued request
//! for the current filter.
//!
//! Snapshots are replaced wholesale and published on a
//! [`tokio::sync::watch`] channel.

use shared::{Category, CreateTaskRequest, Task, TaskFilter, UpdateTaskRequest};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{ClientError, TaskApi};

/// What a view renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub filter: TaskFilter,
    /// Last successfully fetched list, in server order. Kept across
    /// failed fetches and filter changes until a newer result lands.
    pub tasks: Arc<Vec<Task>>,
    /// A fetch for `filter` is in flight.
    pub is_loading: bool,
    /// Last fetch failure; cleared by the next successful fetch.
    pub error: Option<ClientError>,
}

struct StoreState {
    snapshot: StoreSnapshot,
    next_token: u64,
    latest_token: u64,
}

struct Inner<A> {
    api: A,
    state: Mutex<StoreState>,
    published: watch::Sender<StoreSnapshot>,
}

/// Cheap to clone; clones share the same state.
pub struct TaskStore<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for TaskStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: TaskApi + 'static> TaskStore<A> {
    /// Creates an idle store on `Category::All` with no search. Nothing is
    /// fetched until [`refresh`](Self::refresh) or a filter change.
    pub fn new(api: A) -> Self {
        Self::with_filter(api, TaskFilter::default())
    }

    pub fn with_filter(api: A, filter: TaskFilter) -> Self {
        let snapshot = StoreSnapshot {
            filter,
            ..Default::default()
        };
        let (published, _) = watch::channel(snapshot.clone());
        Self {
            inner: Arc::new(Inner {
                api,
                state: Mutex::new(StoreState {
                    snapshot,
                    next_token: 0,
                    latest_token: 0,
                }),
                published,
            }),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state().snapshot.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.inner.published.subscribe()
    }

    pub fn filter(&self) -> TaskFilter {
        self.state().snapshot.filter.clone()
    }

    pub fn set_category(&self, category: Category) -> Option<JoinHandle<()>> {
        self.update_filter(|filter| filter.category = category)
    }

    pub fn set_search(&self, search: impl Into<String>) -> Option<JoinHandle<()>> {
        let search = search.into();
        self.update_filter(|filter| filter.search = search)
    }

    /// Switches the active key and spawns a fetch for it.
    ///
    /// Returns `None` when `filter` is already active. Must be called from
    /// within a tokio runtime.
    pub fn set_filter(&self, filter: TaskFilter) -> Option<JoinHandle<()>> {
        self.update_filter(|current| *current = filter)
    }

    // the read, the change and the compare share one lock
    fn update_filter(&self, change: impl FnOnce(&mut TaskFilter)) -> Option<JoinHandle<()>> {
        let (filter, token) = {
            let mut state = self.state();
            let mut filter = state.snapshot.filter.clone();
            change(&mut filter);
            if state.snapshot.filter == filter {
                return None;
            }
            debug!(category = %filter.category, search = ?filter.search_term(), "filter changed");
            state.snapshot.filter = filter.clone();
            (filter, self.begin_fetch(&mut state))
        };

        let store = self.clone();
        Some(tokio::spawn(async move {
            store.run_fetch(filter, token).await;
        }))
    }

    /// Marks the list stale and refetches it for the active key.
    pub async fn refresh(&self) {
        let (filter, token) = {
            let mut state = self.state();
            let token = self.begin_fetch(&mut state);
            (state.snapshot.filter.clone(), token)
        };
        self.run_fetch(filter, token).await;
    }

    /// Like [`refresh`](Self::refresh), but spawned.
    pub fn invalidate(&self) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move { store.refresh().await })
    }

    pub async fn add(&self, request: CreateTaskRequest) -> Result<(), ClientError> {
        let result = self.inner.api.create(&request).await;
        self.after_mutation("add", result).await
    }

    pub async fn update(&self, id: &str, request: UpdateTaskRequest) -> Result<(), ClientError> {
        let result = self.inner.api.update(id, &request).await;
        self.after_mutation("update", result).await
    }

    pub async fn toggle(&self, id: &str) -> Result<(), ClientError> {
        let result = self.inner.api.toggle(id).await;
        self.after_mutation("toggle", result).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let result = self.inner.api.delete(id).await;
        self.after_mutation("remove", result).await
    }

    async fn after_mutation<T>(
        &self,
        action: &'static str,
        result: Result<T, ClientError>,
    ) -> Result<(), ClientError> {
        match result {
            Ok(_) => {
                debug!(action, "mutation succeeded, refetching");
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!(action, error = %e, "mutation failed");
                Err(e)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_fetch(&self, state: &mut StoreState) -> u64 {
        state.next_token += 1;
        state.latest_token = state.next_token;
        state.snapshot.is_loading = true;
        self.publish(state);
        state.latest_token
    }

    async fn run_fetch(&self, filter: TaskFilter, token: u64) {
        let result = self
            .inner
            .api
            .list(Some(filter.category), filter.search_term())
            .await;
        self.finish_fetch(&filter, token, result);
    }

    fn finish_fetch(&self, filter: &TaskFilter, token: u64, result: Result<Vec<Task>, ClientError>) {
        let mut state = self.state();

        if state.snapshot.filter != *filter || state.latest_token != token {
            debug!(token, latest = state.latest_token, "discarding stale result");
            return;
        }

        match result {
            Ok(tasks) => {
                debug!(token, count = tasks.len(), "applied fetch result");
                state.snapshot.tasks = Arc::new(tasks);
                state.snapshot.error = None;
            }
            Err(e) => {
                warn!(token, error = %e, "fetch failed, keeping last tasks");
                state.snapshot.error = Some(e);
            }
        }
        state.snapshot.is_loading = false;
        self.publish(&state);
    }

    fn publish(&self, state: &StoreState) {
        self.inner.published.send_replace(state.snapshot.clone());
    }
}
