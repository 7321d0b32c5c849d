use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};

use crate::session::{metrics, SessionRecord};
use crate::shared::AccountId;

/// How the primary store keeps rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WriteMode {
    /// One immutable row per finished session
    #[default]
    Append,
    /// One row per player, map and UTC day; later sessions are folded in
    #[strum(to_string = "daily", serialize = "upsert")]
    Daily,
}

/// Identifies the finished session a row was built from
///
/// A cached row and every re-delivered copy of it share the same key.
pub type SessionKey = (AccountId, String, DateTime<Utc>);

/// Durable form of a finished session, shared by both stores
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PersistedRow {
    #[sqlx(rename = "accountid", try_from = "i64")]
    pub account_id: AccountId,
    pub name: String,
    #[sqlx(try_from = "i64")]
    pub kills: u32,
    #[sqlx(try_from = "i64")]
    pub deaths: u32,
    pub kdr: f64,
    pub kpr: f64,
    #[sqlx(try_from = "i64")]
    pub rounds: u32,
    pub opps: f64,
    #[sqlx(try_from = "i64")]
    pub knives: u32,
    pub glv: i64,
    pub map: String,
    pub saved_at: DateTime<Utc>,
}

impl PersistedRow {
    pub fn from_record(
        account_id: AccountId,
        record: &SessionRecord,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            name: record.name().to_string(),
            kills: record.kills(),
            deaths: record.deaths(),
            kdr: record.kill_death_ratio(),
            kpr: record.kills_per_round(),
            rounds: record.rounds(),
            opps: record.average_opponents(),
            knives: record.knife_kills(),
            glv: record.rating(),
            map: record.map().to_string(),
            saved_at,
        }
    }

    /// UTC day the row belongs to under [`WriteMode::Daily`]
    pub fn day(&self) -> NaiveDate {
        self.saved_at.date_naive()
    }

    pub fn session_key(&self) -> SessionKey {
        (self.account_id, self.map.clone(), self.saved_at)
    }

    /// Folds another row for the same player, map and day into this one
    ///
    /// Counters add up, ratios and rating are recomputed from the totals and
    /// the opponent average is weighted by rounds. Name and timestamp come
    /// from whichever row was saved last, whatever order the rows arrive in.
    pub fn merge_daily(&self, other: &PersistedRow) -> PersistedRow {
        let kills = self.kills.saturating_add(other.kills);
        let deaths = self.deaths.saturating_add(other.deaths);
        let rounds = self.rounds.saturating_add(other.rounds);
        let kdr = metrics::ratio(kills, deaths);

        let own_weight = f64::from(self.rounds.max(1));
        let other_weight = f64::from(other.rounds.max(1));
        let opps =
            (self.opps * own_weight + other.opps * other_weight) / (own_weight + other_weight);

        let latest = if other.saved_at >= self.saved_at {
            other
        } else {
            self
        };

        PersistedRow {
            account_id: self.account_id,
            name: latest.name.clone(),
            kills,
            deaths,
            kdr,
            kpr: metrics::ratio(kills, rounds),
            rounds,
            opps,
            knives: self.knives.saturating_add(other.knives),
            glv: metrics::rating(kdr, kills),
            map: self.map.clone(),
            saved_at: latest.saved_at,
        }
    }
}
