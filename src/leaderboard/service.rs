use std::sync::Arc;
use tracing::instrument;

use crate::event::{StatsEvent, StatsObserver};
use crate::persistence::{PersistedRow, PrimaryStore};

/// Result of a leaderboard query
#[derive(Debug, Clone, PartialEq)]
pub enum Leaderboard {
    /// Rows ordered by kills, highest first; may be empty
    Ranked(Vec<PersistedRow>),
    /// The primary store could not answer
    Unavailable,
}

/// Read-only top-N queries against the primary store
///
/// There is no fallback read path: during an outage the leaderboard is simply
/// unavailable.
pub struct QueryService {
    primary: Arc<dyn PrimaryStore>,
    observer: Arc<dyn StatsObserver>,
}

impl QueryService {
    pub fn new(primary: Arc<dyn PrimaryStore>, observer: Arc<dyn StatsObserver>) -> Self {
        Self { primary, observer }
    }

    /// Ties keep whatever order the store returns for a single query
    #[instrument(skip(self))]
    pub async fn top_by_kills(&self, map: &str, limit: u32) -> Leaderboard {
        match self.primary.top_by_kills(map, limit).await {
            Ok(rows) => Leaderboard::Ranked(rows),
            Err(error) => {
                self.observer.on_event(&StatsEvent::LeaderboardUnavailable {
                    map: map.to_string(),
                    error,
                });
                Leaderboard::Unavailable
            }
        }
    }
}
