#![allow(dead_code)]

use async_trait::async_trait;
use pokedex_abilities::{
    parse_cursor, AbilityError, AbilityPage, AbilityRef, AbilitySource, ListConfig, ListState,
    MemorySnapshotStore, Result, SnapshotStore,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

pub fn ability(i: usize) -> AbilityRef {
    AbilityRef::new(
        format!("ability-{i}"),
        format!("https://pokeapi.co/api/v2/ability/{}/", i + 1),
    )
}

/// Offset-addressable listing of `total` abilities, shaped like the PokeAPI.
pub struct FakeSource {
    config: ListConfig,
    total: usize,
    fetched: Mutex<Vec<String>>,
    fail_next: AtomicUsize,
    hold: AtomicBool,
    gate: Notify,
}

impl FakeSource {
    pub fn new(total: usize) -> Self {
        Self {
            config: ListConfig::default(),
            total,
            fetched: Mutex::new(Vec::new()),
            fail_next: AtomicUsize::new(0),
            hold: AtomicBool::new(false),
            gate: Notify::new(),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Fail the next `n` fetches with a 503.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Park fetches until [`FakeSource::release`].
    pub fn hold_fetches(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.gate.notify_one();
    }
}

#[async_trait]
impl AbilitySource for FakeSource {
    async fn fetch_page(&self, cursor: &str) -> Result<AbilityPage> {
        if self.hold.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.fetched.lock().unwrap().push(cursor.to_string());

        let failing = self.fail_next.load(Ordering::SeqCst);
        if failing > 0 {
            self.fail_next.store(failing - 1, Ordering::SeqCst);
            return Err(AbilityError::Status {
                status: 503,
                url: cursor.to_string(),
            });
        }

        let pos = parse_cursor(cursor)?;
        let start = pos.offset.min(self.total);
        let end = pos.end().min(self.total);
        let next = (end < self.total).then(|| self.config.cursor_at(end));
        let previous = (start > 0).then(|| self.config.cursor_at(start.saturating_sub(pos.limit)));
        Ok(AbilityPage {
            count: Some(self.total as u64),
            next,
            previous,
            results: (start..end).map(ability).collect(),
        })
    }
}

/// Memory store that counts writes and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemorySnapshotStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn seed(&self, key: &str, state: &ListState) {
        let bytes = serde_json::to_vec(state).unwrap();
        self.inner.set(key, &bytes).await.unwrap();
    }

    pub async fn snapshot(&self, key: &str) -> Option<ListState> {
        let bytes = self.inner.get(key).await.unwrap()?;
        Some(serde_json::from_slice(&bytes).unwrap())
    }
}

#[async_trait]
impl SnapshotStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AbilityError::Io(std::io::Error::other("read refused")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AbilityError::Io(std::io::Error::other("disk full")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}

pub fn listed(len: usize) -> ListState {
    let config = ListConfig::default();
    ListState {
        items: (0..len).map(ability).collect(),
        next: Some(config.cursor_at(len)),
        previous: (len > config.page_size).then(|| config.cursor_at(len - config.page_size)),
    }
}
