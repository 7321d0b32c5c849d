use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{PersistedRow, SessionKey, WriteMode};
use crate::shared::StatsError;

/// Operations shared by the primary and local stores
#[async_trait]
pub trait Store: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Liveness probe run before every operation
    async fn is_available(&self) -> bool;

    /// Writes one row as its own commit
    ///
    /// Rows may be delivered more than once; under [`WriteMode::Daily`] a
    /// primary must fold each session into its daily row only once.
    async fn write(&self, row: &PersistedRow) -> Result<(), StatsError>;

    async fn close(&self);
}

/// Durable store of record
#[async_trait]
pub trait PrimaryStore: Store {
    /// Rows for `map` ordered by kills, highest first, at most `limit` of them
    async fn top_by_kills(&self, map: &str, limit: u32) -> Result<Vec<PersistedRow>, StatsError>;
}

/// Fallback queue used while the primary is unreachable
#[async_trait]
pub trait LocalStore: Store {
    /// Every queued row, oldest first
    async fn queued(&self) -> Result<Vec<PersistedRow>, StatsError>;

    /// Drops every queued row, returning how many were removed
    async fn clear(&self) -> Result<u64, StatsError>;
}

/// Switches shared by the in-memory stores to simulate outages
#[derive(Debug)]
struct Faults {
    available: AtomicBool,
    fail_writes: AtomicBool,
}

impl Faults {
    fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn check_write(&self, store: &str) -> Result<(), StatsError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StatsError::Unavailable(format!("{} is down", store)));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StatsError::Database(format!("{} rejected the write", store)));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PrimaryState {
    rows: Vec<PersistedRow>,
    /// Sessions already folded into a daily row
    merged: HashSet<SessionKey>,
    /// Remaining writes before the store starts rejecting them; `None` means unlimited
    writes_before_failure: Option<usize>,
}

/// In-memory primary store for development and testing
///
/// Data is lost when the process exits. Availability and write failures can
/// be toggled to exercise the fallback path.
#[derive(Debug)]
pub struct InMemoryPrimaryStore {
    state: Arc<RwLock<PrimaryState>>,
    mode: WriteMode,
    faults: Faults,
}

impl Default for InMemoryPrimaryStore {
    fn default() -> Self {
        Self::new(WriteMode::Append)
    }
}

impl InMemoryPrimaryStore {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            state: Arc::new(RwLock::new(PrimaryState::default())),
            mode,
            faults: Faults::new(),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.faults.available.store(available, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.faults.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Accepts `count` more writes, then starts rejecting them
    pub async fn fail_after(&self, count: usize) {
        self.state.write().await.writes_before_failure = Some(count);
    }

    /// Lifts a limit set by [`InMemoryPrimaryStore::fail_after`]
    pub async fn clear_write_limit(&self) {
        self.state.write().await.writes_before_failure = None;
    }

    pub async fn rows(&self) -> Vec<PersistedRow> {
        self.state.read().await.rows.clone()
    }
}

impl PrimaryState {
    fn consume_budget(&mut self) -> Result<(), StatsError> {
        match self.writes_before_failure.as_mut() {
            Some(0) => Err(StatsError::Database(
                "in-memory primary write budget exhausted".to_string(),
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn fold_daily(&mut self, row: &PersistedRow) {
        if !self.merged.insert(row.session_key()) {
            debug!("Session already folded into its daily row, skipping");
            return;
        }

        let existing = self.rows.iter_mut().find(|r| {
            r.account_id == row.account_id && r.map == row.map && r.day() == row.day()
        });
        match existing {
            Some(existing) => *existing = existing.merge_daily(row),
            None => self.rows.push(row.clone()),
        }
    }
}

#[async_trait]
impl Store for InMemoryPrimaryStore {
    fn name(&self) -> &'static str {
        "memory-primary"
    }

    async fn is_available(&self) -> bool {
        self.faults.available.load(Ordering::SeqCst)
    }

    #[instrument(skip(self, row), fields(account_id = row.account_id))]
    async fn write(&self, row: &PersistedRow) -> Result<(), StatsError> {
        self.faults.check_write(self.name())?;

        let mut state = self.state.write().await;
        state.consume_budget()?;
        match self.mode {
            WriteMode::Append => state.rows.push(row.clone()),
            WriteMode::Daily => state.fold_daily(row),
        }

        debug!(total_rows = state.rows.len(), "Row written to memory primary");
        Ok(())
    }

    async fn close(&self) {}
}

#[async_trait]
impl PrimaryStore for InMemoryPrimaryStore {
    #[instrument(skip(self))]
    async fn top_by_kills(&self, map: &str, limit: u32) -> Result<Vec<PersistedRow>, StatsError> {
        if !self.faults.available.load(Ordering::SeqCst) {
            warn!("Memory primary unavailable for leaderboard query");
            return Err(StatsError::Unavailable(format!("{} is down", self.name())));
        }

        let mut rows: Vec<PersistedRow> = self
            .state
            .read()
            .await
            .rows
            .iter()
            .filter(|r| r.map == map)
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal kill counts
        rows.sort_by(|a, b| b.kills.cmp(&a.kills));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

/// In-memory local queue for development and testing
#[derive(Debug)]
pub struct InMemoryLocalStore {
    rows: Arc<RwLock<Vec<PersistedRow>>>,
    faults: Faults,
}

impl Default for InMemoryLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            faults: Faults::new(),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.faults.available.store(available, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.faults.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn rows(&self) -> Vec<PersistedRow> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl Store for InMemoryLocalStore {
    fn name(&self) -> &'static str {
        "memory-local"
    }

    async fn is_available(&self) -> bool {
        self.faults.available.load(Ordering::SeqCst)
    }

    async fn write(&self, row: &PersistedRow) -> Result<(), StatsError> {
        self.faults.check_write(self.name())?;
        self.rows.write().await.push(row.clone());
        Ok(())
    }

    async fn close(&self) {}
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn queued(&self) -> Result<Vec<PersistedRow>, StatsError> {
        if !self.faults.available.load(Ordering::SeqCst) {
            return Err(StatsError::Unavailable(format!("{} is down", self.name())));
        }
        Ok(self.rows().await)
    }

    async fn clear(&self) -> Result<u64, StatsError> {
        if !self.faults.available.load(Ordering::SeqCst) {
            return Err(StatsError::Unavailable(format!("{} is down", self.name())));
        }
        let mut rows = self.rows.write().await;
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }
}
