use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Connection, Executor};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use super::models::PersistedRow;
use super::repository::{LocalStore, Store};
use crate::shared::StatsError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stats (
    accountid INTEGER NOT NULL,
    name TEXT NOT NULL,
    kills INTEGER NOT NULL,
    deaths INTEGER NOT NULL,
    kdr REAL NOT NULL,
    kpr REAL NOT NULL,
    rounds INTEGER NOT NULL,
    opps REAL NOT NULL,
    knives INTEGER NOT NULL,
    glv INTEGER NOT NULL,
    map TEXT NOT NULL,
    saved_at TEXT NOT NULL
)
"#;

/// SQLite implementation of the local fallback queue
pub struct SqliteStatsStore {
    pool: SqlitePool,
}

impl SqliteStatsStore {
    /// Opens (creating if missing) the database file lazily
    pub fn open(path: &str) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options)
    }

    /// Private in-memory database, kept alive for the lifetime of the store
    pub fn in_memory() -> Result<Self, StatsError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            warn!(error = %e, "Invalid in-memory SQLite options");
            StatsError::from(e)
        })?;
        Ok(Self::with_options(options))
    }

    fn with_options(options: SqliteConnectOptions) -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute(SCHEMA).await?;
                    info!("Connected to the local store, schema ready");
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStatsStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        if self.pool.is_closed() {
            return false;
        }
        match self.pool.acquire().await {
            Ok(mut conn) => conn.ping().await.is_ok(),
            Err(e) => {
                warn!(error = %e, "Local store unavailable");
                false
            }
        }
    }

    #[instrument(skip(self, row), fields(account_id = row.account_id))]
    async fn write(&self, row: &PersistedRow) -> Result<(), StatsError> {
        debug!(map = %row.map, "Caching row in local store");

        sqlx::query(
            "INSERT INTO stats (accountid, name, kills, deaths, kdr, kpr, rounds, opps, knives, \
             glv, map, saved_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(i64::from(row.account_id))
        .bind(&row.name)
        .bind(i64::from(row.kills))
        .bind(i64::from(row.deaths))
        .bind(row.kdr)
        .bind(row.kpr)
        .bind(i64::from(row.rounds))
        .bind(row.opps)
        .bind(i64::from(row.knives))
        .bind(row.glv)
        .bind(&row.map)
        .bind(row.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to cache row in local store");
            StatsError::from(e)
        })?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LocalStore for SqliteStatsStore {
    #[instrument(skip(self))]
    async fn queued(&self) -> Result<Vec<PersistedRow>, StatsError> {
        let rows = sqlx::query_as::<_, PersistedRow>(
            "SELECT accountid, name, kills, deaths, kdr, kpr, rounds, opps, knives, glv, map, \
             saved_at FROM stats ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to read queued rows from local store");
            StatsError::from(e)
        })?;

        debug!(count = rows.len(), "Read queued rows from local store");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<u64, StatsError> {
        let result = sqlx::query("DELETE FROM stats")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to clear local store");
                StatsError::from(e)
            })?;

        Ok(result.rows_affected())
    }
}
