use crate::window::shrink_window;
use crate::{
    AbilityError, AbilitySource, ListConfig, ListState, ListView, Result, SnapshotStore,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A fetch-bearing operation, recorded when it fails so it can be retried
/// with identical arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOperation {
    Hydrate,
    Grow(String),
    Refresh,
}

#[derive(Debug, Default)]
struct OpState {
    /// Cursor whose page is the current tail of the list
    last_applied: Option<String>,
}

#[derive(Debug, Default)]
struct Shared {
    view: ListView,
    failed: Option<ListOperation>,
}

enum Apply {
    Append,
    Replace,
}

/// Holds the operation lock; clears `loading` however the operation ends.
struct InFlight<'a> {
    ops: tokio::sync::MutexGuard<'a, OpState>,
    shared: &'a Mutex<Shared>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.shared).view.loading = false;
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The "show more / show less" ability list.
///
/// Grows by appending whole remote pages, shrinks by local truncation, and
/// writes every change through to a [`SnapshotStore`]. At most one operation
/// runs at a time; a call made while another is in flight fails with
/// [`AbilityError::Busy`] and leaves everything untouched.
///
/// The `request_*` methods are the consumer surface: they never fail and
/// report problems through [`ListView::error`].
pub struct AbilityList<S, C> {
    source: S,
    store: C,
    config: ListConfig,
    ops: tokio::sync::Mutex<OpState>,
    shared: Mutex<Shared>,
}

impl<S, C> AbilityList<S, C>
where
    S: AbilitySource,
    C: SnapshotStore,
{
    pub fn new(source: S, store: C, config: ListConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            store,
            config,
            ops: tokio::sync::Mutex::new(OpState::default()),
            shared: Mutex::new(Shared::default()),
        })
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn current_state(&self) -> ListState {
        lock(&self.shared).view.state.clone()
    }

    pub fn view(&self) -> ListView {
        lock(&self.shared).view.clone()
    }

    pub fn loading(&self) -> bool {
        lock(&self.shared).view.loading
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.shared).view.error.clone()
    }

    /// The last operation that failed, until any later operation starts.
    pub fn failed_operation(&self) -> Option<ListOperation> {
        lock(&self.shared).failed.clone()
    }

    /// Load the cached snapshot verbatim, or fetch the first page when there
    /// is none (or it cannot be read). Either way the result replaces whatever
    /// the list held before.
    pub async fn hydrate(&self) -> Result<ListState> {
        let mut flight = self.begin()?;

        if let Some(state) = self.read_snapshot().await {
            log::info!(
                "Restored {} abilities from {} cache",
                state.len(),
                self.store.name()
            );
            flight.ops.last_applied = None;
            self.commit(state.clone());
            return Ok(state);
        }

        log::info!("No cached abilities; fetching the first page");
        let cursor = self.config.first_page_cursor();
        self.fetch_and_apply(&mut flight, &cursor, ListOperation::Hydrate, Apply::Replace)
            .await
    }

    /// Fetch the page at `cursor` and append it.
    ///
    /// Re-applying the cursor whose page is already the tail of the list is a
    /// no-op.
    pub async fn grow(&self, cursor: &str) -> Result<ListState> {
        let mut flight = self.begin()?;

        if flight.ops.last_applied.as_deref() == Some(cursor) {
            log::debug!("Page {cursor} already applied; skipping fetch");
            return Ok(self.current_state());
        }

        self.fetch_and_apply(
            &mut flight,
            cursor,
            ListOperation::Grow(cursor.to_string()),
            Apply::Append,
        )
        .await
    }

    /// Retract the tail of the list and synthesize cursors for the shorter
    /// window. No-op at or below one page.
    pub async fn shrink(&self) -> Result<ListState> {
        let mut flight = self.begin()?;

        let current = self.current_state();
        let Some(state) = shrink_window(&current, &self.config) else {
            log::debug!("Shrink ignored at {} abilities", current.len());
            return Ok(current);
        };

        log::debug!("Shrinking {} -> {} abilities", current.len(), state.len());
        self.persist(&state).await;
        flight.ops.last_applied = None;
        self.commit(state.clone());
        Ok(state)
    }

    /// Replace the list with a freshly fetched first page.
    pub async fn refresh(&self) -> Result<ListState> {
        let mut flight = self.begin()?;
        let cursor = self.config.first_page_cursor();
        self.fetch_and_apply(&mut flight, &cursor, ListOperation::Refresh, Apply::Replace)
            .await
    }

    /// Re-issue the last failed operation, if any.
    pub async fn retry(&self) -> Result<ListState> {
        match self.failed_operation() {
            Some(ListOperation::Hydrate) => self.hydrate().await,
            Some(ListOperation::Grow(cursor)) => self.grow(&cursor).await,
            Some(ListOperation::Refresh) => self.refresh().await,
            None => Ok(self.current_state()),
        }
    }

    pub async fn request_hydrate(&self) -> ListView {
        self.settle(self.hydrate().await, "hydrate")
    }

    /// "Show more": grow from the current `next` cursor, if there is one.
    pub async fn request_grow(&self) -> ListView {
        let Some(cursor) = self.current_state().next else {
            log::debug!("No next page; show more ignored");
            return self.view();
        };
        self.settle(self.grow(&cursor).await, "show more")
    }

    /// "Show less": shrink, if more than one page is shown.
    pub async fn request_shrink(&self) -> ListView {
        if self.current_state().len() <= self.config.page_size {
            log::debug!("At most one page shown; show less ignored");
            return self.view();
        }
        self.settle(self.shrink().await, "show less")
    }

    pub async fn request_refresh(&self) -> ListView {
        self.settle(self.refresh().await, "refresh")
    }

    pub async fn request_retry(&self) -> ListView {
        self.settle(self.retry().await, "retry")
    }

    fn settle(&self, outcome: Result<ListState>, what: &str) -> ListView {
        match outcome {
            Ok(_) => {}
            Err(AbilityError::Busy) => log::warn!("Rejected {what}: another operation is in flight"),
            Err(err) => log::debug!("{what} failed: {err}"),
        }
        self.view()
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        let ops = self.ops.try_lock().map_err(|_| AbilityError::Busy)?;
        {
            let mut shared = lock(&self.shared);
            shared.view.loading = true;
            shared.view.error = None;
            shared.failed = None;
        }
        Ok(InFlight {
            ops,
            shared: &self.shared,
        })
    }

    fn commit(&self, state: ListState) {
        lock(&self.shared).view.state = state;
    }

    fn fail(&self, op: ListOperation, err: &AbilityError) {
        let mut shared = lock(&self.shared);
        shared.view.error = Some(err.to_string());
        shared.failed = Some(op);
    }

    async fn fetch_and_apply(
        &self,
        flight: &mut InFlight<'_>,
        cursor: &str,
        op: ListOperation,
        apply: Apply,
    ) -> Result<ListState> {
        let page = match self.source.fetch_page(cursor).await {
            Ok(page) => page,
            Err(err) => {
                log::warn!("Fetching abilities from {cursor} failed: {err}");
                self.fail(op, &err);
                return Err(err);
            }
        };

        let mut state = match apply {
            Apply::Append => self.current_state(),
            Apply::Replace => ListState::default(),
        };
        let fetched = page.results.len();
        state.items.extend(page.results);
        state.next = page.next;
        state.previous = page.previous;
        log::debug!(
            "Applied {fetched} abilities from {cursor}; now {}",
            state.len()
        );

        self.persist(&state).await;
        flight.ops.last_applied = Some(cursor.to_string());
        self.commit(state.clone());
        Ok(state)
    }

    async fn read_snapshot(&self) -> Option<ListState> {
        let key = &self.config.cache_key;
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("Reading cached abilities ({key}) failed: {err}");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Some(state),
            Err(err) => {
                log::warn!("Cached abilities ({key}) are corrupted: {err}");
                None
            }
        }
    }

    /// Write-through; failures leave the cache stale but never fail the caller.
    async fn persist(&self, state: &ListState) {
        let key = &self.config.cache_key;
        let bytes = match serde_json::to_vec(state) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("Encoding abilities snapshot failed: {err}");
                return;
            }
        };
        if let Err(err) = self.store.set(key, &bytes).await {
            log::warn!(
                "Storing abilities in {} cache ({key}) failed: {err}",
                self.store.name()
            );
        }
    }
}
