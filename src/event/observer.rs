use std::fmt;

use tracing::{debug, error, info, warn};

use crate::shared::{AccountId, StatsError};

/// Why a record went to the local store instead of the primary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheReason {
    PrimaryDown,
    PrimaryWriteFailed,
}

impl fmt::Display for CacheReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheReason::PrimaryDown => write!(f, "primary store unreachable"),
            CacheReason::PrimaryWriteFailed => write!(f, "primary store write failed"),
        }
    }
}

/// Lifecycle facts reported by the core for logging and diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum StatsEvent {
    SessionStarted {
        account_id: AccountId,
        name: String,
        map: String,
    },
    SessionEnded {
        account_id: AccountId,
    },
    Stored {
        account_id: AccountId,
        store: &'static str,
    },
    Cached {
        account_id: AccountId,
        reason: CacheReason,
    },
    PrimaryWriteFailed {
        account_id: AccountId,
        error: StatsError,
    },
    PersistFailed {
        account_id: AccountId,
        error: StatsError,
    },
    Reconciled {
        rows: usize,
    },
    ReconcileFailed {
        synced: usize,
        pending: usize,
        error: StatsError,
    },
    LeaderboardUnavailable {
        map: String,
        error: StatsError,
    },
    StoreClosed {
        store: &'static str,
    },
}

/// Sink for [`StatsEvent`]s
///
/// Observers must not fail or block for long; they run inline on the
/// event-handling task.
pub trait StatsObserver: Send + Sync {
    fn on_event(&self, event: &StatsEvent);

    /// Get a human-readable name for this observer (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Writes every event to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StatsObserver for TracingObserver {
    fn on_event(&self, event: &StatsEvent) {
        match event {
            StatsEvent::SessionStarted {
                account_id,
                name,
                map,
            } => info!(account_id, name = %name, map = %map, "Starting session"),
            StatsEvent::SessionEnded { account_id } => {
                info!(account_id, "Session ended")
            }
            StatsEvent::Stored { account_id, store } => {
                info!(account_id, store, "Stored session")
            }
            StatsEvent::Cached { account_id, reason } => {
                info!(account_id, reason = %reason, "Caching session in local store")
            }
            StatsEvent::PrimaryWriteFailed { account_id, error } => {
                warn!(account_id, error = %error, "Primary store write failed")
            }
            StatsEvent::PersistFailed { account_id, error } => {
                error!(account_id, error = %error, "Session could not be persisted")
            }
            StatsEvent::Reconciled { rows } => {
                info!(rows, "Cache synced and cleared successfully")
            }
            StatsEvent::ReconcileFailed {
                synced,
                pending,
                error,
            } => warn!(
                synced,
                pending,
                error = %error,
                "Cache sync incomplete, keeping local rows"
            ),
            StatsEvent::LeaderboardUnavailable { map, error } => {
                error!(map = %map, error = %error, "Leaderboard query failed")
            }
            StatsEvent::StoreClosed { store } => debug!(store, "Store closed"),
        }
    }

    fn name(&self) -> &'static str {
        "TracingObserver"
    }
}

/// Observer that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl StatsObserver for NoOpObserver {
    fn on_event(&self, _event: &StatsEvent) {}

    fn name(&self) -> &'static str {
        "NoOpObserver"
    }
}
