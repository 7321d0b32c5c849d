use chrono::Utc;
use std::sync::Arc;

use super::models::PersistedRow;
use super::repository::{LocalStore, PrimaryStore};
use crate::event::{CacheReason, StatsEvent, StatsObserver};
use crate::session::SessionRecord;
use crate::shared::{AccountId, StatsError};

/// Where a persisted session ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Written to the primary store
    Stored,
    /// Written to the local store, to be reconciled later
    Cached(CacheReason),
    /// Neither store accepted the row
    Lost,
}

impl PersistOutcome {
    pub fn is_durable(&self) -> bool {
        !matches!(self, PersistOutcome::Lost)
    }
}

/// Dual-store write path: primary first, local fallback, lazy reconciliation
///
/// Liveness is probed at each operation; there is no background health check.
/// Each row is written and committed on its own so a failure only affects
/// that one player's record. Failures are reported to the observer and turned
/// into outcomes, never returned to the event-handling caller.
pub struct PersistenceGateway {
    primary: Arc<dyn PrimaryStore>,
    local: Arc<dyn LocalStore>,
    observer: Arc<dyn StatsObserver>,
}

impl PersistenceGateway {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        local: Arc<dyn LocalStore>,
        observer: Arc<dyn StatsObserver>,
    ) -> Self {
        Self {
            primary,
            local,
            observer,
        }
    }

    /// Brings both stores up and flushes anything left over from a previous outage
    pub async fn open(&self) {
        let local_up = self.local.is_available().await;
        let primary_up = self.primary.is_available().await;
        if primary_up && local_up {
            let _ = self.reconcile().await;
        }
    }

    pub async fn persist(&self, account_id: AccountId, record: &SessionRecord) -> PersistOutcome {
        let row = PersistedRow::from_record(account_id, record, Utc::now());
        self.persist_row(&row).await
    }

    pub async fn persist_row(&self, row: &PersistedRow) -> PersistOutcome {
        if !self.primary.is_available().await {
            return self.cache(row, CacheReason::PrimaryDown).await;
        }

        match self.primary.write(row).await {
            Ok(()) => {
                self.observer.on_event(&StatsEvent::Stored {
                    account_id: row.account_id,
                    store: self.primary.name(),
                });
                // Failures are already reported to the observer; the local rows stay queued
                let _ = self.reconcile().await;
                PersistOutcome::Stored
            }
            Err(error) => {
                self.observer.on_event(&StatsEvent::PrimaryWriteFailed {
                    account_id: row.account_id,
                    error,
                });
                self.cache(row, CacheReason::PrimaryWriteFailed).await
            }
        }
    }

    async fn cache(&self, row: &PersistedRow, reason: CacheReason) -> PersistOutcome {
        let result = if self.local.is_available().await {
            self.local.write(row).await
        } else {
            Err(StatsError::Unavailable(format!(
                "{} connection is not open, cannot cache session",
                self.local.name()
            )))
        };

        match result {
            Ok(()) => {
                self.observer.on_event(&StatsEvent::Cached {
                    account_id: row.account_id,
                    reason,
                });
                PersistOutcome::Cached(reason)
            }
            Err(error) => {
                self.observer.on_event(&StatsEvent::PersistFailed {
                    account_id: row.account_id,
                    error,
                });
                PersistOutcome::Lost
            }
        }
    }

    /// Copies every queued local row into the primary, clearing the local store
    /// only once all of them made it
    ///
    /// Rows already copied before a failure stay in the primary and are copied
    /// again on the next attempt, so delivery is at-least-once. Append primaries
    /// keep the duplicates; daily primaries skip sessions they already folded in.
    pub async fn reconcile(&self) -> Result<usize, StatsError> {
        let queued = match self.queued_for_sync().await {
            Ok(queued) => queued,
            Err(error) => {
                self.observer.on_event(&StatsEvent::ReconcileFailed {
                    synced: 0,
                    pending: 0,
                    error: error.clone(),
                });
                return Err(error);
            }
        };
        if queued.is_empty() {
            return Ok(0);
        }

        for (synced, row) in queued.iter().enumerate() {
            if let Err(error) = self.primary.write(row).await {
                self.observer.on_event(&StatsEvent::ReconcileFailed {
                    synced,
                    pending: queued.len() - synced,
                    error: error.clone(),
                });
                return Err(error);
            }
        }

        if let Err(error) = self.local.clear().await {
            self.observer.on_event(&StatsEvent::ReconcileFailed {
                synced: queued.len(),
                pending: queued.len(),
                error: error.clone(),
            });
            return Err(error);
        }

        self.observer.on_event(&StatsEvent::Reconciled { rows: queued.len() });
        Ok(queued.len())
    }

    async fn queued_for_sync(&self) -> Result<Vec<PersistedRow>, StatsError> {
        if !self.primary.is_available().await {
            return Err(StatsError::Unavailable(format!(
                "{} connection is not open, cannot sync cache",
                self.primary.name()
            )));
        }
        if !self.local.is_available().await {
            return Err(StatsError::Unavailable(format!(
                "{} connection is not open, cannot sync cache",
                self.local.name()
            )));
        }
        self.local.queued().await
    }

    pub async fn close(&self) {
        self.primary.close().await;
        self.observer.on_event(&StatsEvent::StoreClosed {
            store: self.primary.name(),
        });
        self.local.close().await;
        self.observer.on_event(&StatsEvent::StoreClosed {
            store: self.local.name(),
        });
    }
}
