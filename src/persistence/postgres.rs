use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Connection, Executor};
use tracing::{debug, info, instrument, warn};

use super::models::{PersistedRow, WriteMode};
use super::repository::{PrimaryStore, Store};
use crate::config::PrimaryStoreConfig;
use crate::shared::StatsError;

const APPEND_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stats (
    id BIGSERIAL PRIMARY KEY,
    accountid BIGINT NOT NULL,
    name TEXT NOT NULL,
    kills BIGINT NOT NULL,
    deaths BIGINT NOT NULL,
    kdr DOUBLE PRECISION NOT NULL,
    kpr DOUBLE PRECISION NOT NULL,
    rounds BIGINT NOT NULL,
    opps DOUBLE PRECISION NOT NULL,
    knives BIGINT NOT NULL,
    glv BIGINT NOT NULL,
    map VARCHAR(255) NOT NULL,
    saved_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const DAILY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stats_daily (
    accountid BIGINT NOT NULL,
    name TEXT NOT NULL,
    kills BIGINT NOT NULL,
    deaths BIGINT NOT NULL,
    kdr DOUBLE PRECISION NOT NULL,
    kpr DOUBLE PRECISION NOT NULL,
    rounds BIGINT NOT NULL,
    opps DOUBLE PRECISION NOT NULL,
    knives BIGINT NOT NULL,
    glv BIGINT NOT NULL,
    map VARCHAR(255) NOT NULL,
    day DATE NOT NULL,
    saved_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    sessions TIMESTAMPTZ[] NOT NULL DEFAULT '{}',
    PRIMARY KEY (accountid, map, day)
);
ALTER TABLE stats_daily ADD COLUMN IF NOT EXISTS sessions TIMESTAMPTZ[] NOT NULL DEFAULT '{}';
"#;

const COLUMNS: &str =
    "accountid, name, kills, deaths, kdr, kpr, rounds, opps, knives, glv, map, saved_at";

fn table(mode: WriteMode) -> &'static str {
    match mode {
        WriteMode::Append => "stats",
        WriteMode::Daily => "stats_daily",
    }
}

fn schema(mode: WriteMode) -> &'static str {
    match mode {
        WriteMode::Append => APPEND_SCHEMA,
        WriteMode::Daily => DAILY_SCHEMA,
    }
}

/// PostgreSQL implementation of the primary store
///
/// The pool holds a single lazily opened connection. The schema for the
/// configured [`WriteMode`] is created each time that connection is opened.
pub struct PostgresStatsStore {
    pool: PgPool,
    mode: WriteMode,
}

impl PostgresStatsStore {
    pub fn new(pool: PgPool, mode: WriteMode) -> Self {
        Self { pool, mode }
    }

    /// Builds the store without touching the network; the first probe connects
    pub fn connect_lazy(config: &PrimaryStoreConfig) -> Self {
        let mode = config.write_mode;
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.username)
            .password(&config.password);

        let schema = schema(mode);
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(schema).await?;
                    info!(table = table(mode), "Connected to the primary store, schema ready");
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        Self::new(pool, mode)
    }

    async fn insert(&self, row: &PersistedRow) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT INTO stats ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            COLUMNS
        );
        sqlx::query(&query)
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
            .await?;
        Ok(())
    }

    /// Update today's row for the player and map, inserting it when nothing was updated
    ///
    /// The row's `sessions` column lists the save time of every session already
    /// folded in, so a re-delivered row leaves the totals untouched.
    async fn upsert_daily(&self, row: &PersistedRow) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let already_merged: Option<bool> = sqlx::query_scalar(
            "SELECT $4 = ANY(sessions) FROM stats_daily \
             WHERE accountid = $1 AND map = $2 AND day = $3 FOR UPDATE",
        )
        .bind(i64::from(row.account_id))
        .bind(&row.map)
        .bind(row.day())
        .bind(row.saved_at)
        .fetch_optional(&mut *tx)
        .await?;

        if already_merged == Some(true) {
            debug!(account_id = row.account_id, "Session already in today's row, skipping");
            return tx.commit().await;
        }

        let select = format!(
            "SELECT {} FROM stats_daily WHERE accountid = $1 AND map = $2 AND day = $3",
            COLUMNS
        );
        let existing: Option<PersistedRow> = sqlx::query_as(&select)
            .bind(i64::from(row.account_id))
            .bind(&row.map)
            .bind(row.day())
            .fetch_optional(&mut *tx)
            .await?;

        let merged = match &existing {
            Some(existing) => existing.merge_daily(row),
            None => row.clone(),
        };

        let updated = sqlx::query(
            "UPDATE stats_daily SET name = $4, kills = $5, deaths = $6, kdr = $7, kpr = $8, \
             rounds = $9, opps = $10, knives = $11, glv = $12, saved_at = $13, \
             sessions = array_append(sessions, $14) \
             WHERE accountid = $1 AND map = $2 AND day = $3",
        )
        .bind(i64::from(merged.account_id))
        .bind(&merged.map)
        .bind(row.day())
        .bind(&merged.name)
        .bind(i64::from(merged.kills))
        .bind(i64::from(merged.deaths))
        .bind(merged.kdr)
        .bind(merged.kpr)
        .bind(i64::from(merged.rounds))
        .bind(merged.opps)
        .bind(i64::from(merged.knives))
        .bind(merged.glv)
        .bind(merged.saved_at)
        .bind(row.saved_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            debug!(account_id = row.account_id, "No row for today yet, inserting");
            sqlx::query(
                "INSERT INTO stats_daily (accountid, name, kills, deaths, kdr, kpr, rounds, opps, \
                 knives, glv, map, day, saved_at, sessions) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, ARRAY[$13])",
            )
            .bind(i64::from(merged.account_id))
            .bind(&merged.name)
            .bind(i64::from(merged.kills))
            .bind(i64::from(merged.deaths))
            .bind(merged.kdr)
            .bind(merged.kpr)
            .bind(i64::from(merged.rounds))
            .bind(merged.opps)
            .bind(i64::from(merged.knives))
            .bind(merged.glv)
            .bind(&merged.map)
            .bind(row.day())
            .bind(row.saved_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}

#[async_trait]
impl Store for PostgresStatsStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        if self.pool.is_closed() {
            return false;
        }
        match self.pool.acquire().await {
            Ok(mut conn) => match conn.ping().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Primary store ping failed");
                    false
                }
            },
            Err(e) => {
                debug!(error = %e, "Primary store connection unavailable");
                false
            }
        }
    }

    #[instrument(skip(self, row), fields(account_id = row.account_id, mode = %self.mode))]
    async fn write(&self, row: &PersistedRow) -> Result<(), StatsError> {
        debug!(map = %row.map, "Writing row to primary store");

        let result = match self.mode {
            WriteMode::Append => self.insert(row).await,
            WriteMode::Daily => self.upsert_daily(row).await,
        };

        result.map_err(|e| {
            warn!(error = %e, "Failed to write row to primary store");
            StatsError::from(e)
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PrimaryStore for PostgresStatsStore {
    #[instrument(skip(self))]
    async fn top_by_kills(&self, map: &str, limit: u32) -> Result<Vec<PersistedRow>, StatsError> {
        let query = format!(
            "SELECT {} FROM {} WHERE map = $1 ORDER BY kills DESC LIMIT $2",
            COLUMNS,
            table(self.mode)
        );

        let rows = sqlx::query_as::<_, PersistedRow>(&query)
            .bind(map)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, map = %map, "Failed to fetch leaderboard from primary store");
                StatsError::from(e)
            })?;

        debug!(count = rows.len(), "Fetched leaderboard rows");
        Ok(rows)
    }
}
