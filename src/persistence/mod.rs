// Durable storage of finished sessions

// Public API - what other modules can use
pub use gateway::{PersistOutcome, PersistenceGateway};
pub use models::{PersistedRow, SessionKey, WriteMode};
pub use postgres::PostgresStatsStore;
pub use repository::{InMemoryLocalStore, InMemoryPrimaryStore, LocalStore, PrimaryStore, Store};
pub use sqlite::SqliteStatsStore;

// Internal modules
mod gateway;
mod models;
mod postgres;
mod repository;
mod sqlite;
