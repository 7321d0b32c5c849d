// Library crate for the round statistics tracker
// This file exposes the public API for the binary and integration tests

pub mod commands;
pub mod config;
pub mod event;
pub mod feed;
pub mod leaderboard;
pub mod persistence;
pub mod service;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::StatsConfig;
pub use event::{GameEvent, GameHost, HostInput, PlayerInfo, StatsEvent, StatsObserver, Team};
pub use leaderboard::{Leaderboard, QueryService};
pub use persistence::{
    InMemoryLocalStore, InMemoryPrimaryStore, PersistOutcome, PersistedRow, PersistenceGateway,
    WriteMode,
};
pub use service::{StatsService, StatsServiceBuilder};
pub use session::{SessionRecord, SessionStore};
pub use shared::{AccountId, StatsError};
