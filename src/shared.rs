use thiserror::Error;

/// Stable numeric identity of an authorized player
pub type AccountId = u32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for StatsError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StatsError::Unavailable(error.to_string())
            }
            other => StatsError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use crate::session::SessionRecord;

    /// Builds a session record with the given counters already applied
    pub fn record_with(
        name: &str,
        map: &str,
        rounds: u32,
        kills: u32,
        deaths: u32,
    ) -> SessionRecord {
        let mut record = SessionRecord::new(name.to_string(), map.to_string());
        for _ in 0..rounds {
            record.add_round();
        }
        for _ in 0..kills {
            record.add_kill(false);
        }
        for _ in 0..deaths {
            record.add_death();
        }
        record
    }
}
