use std::collections::BTreeMap;

use super::models::SessionRecord;
use crate::shared::AccountId;

/// In-memory registry of live sessions, one per tracked player
///
/// Mutators silently ignore players without a session; callers decide when a
/// session should be started.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: BTreeMap<AccountId, SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
        }
    }

    /// Starts a session unless one already exists. Returns true when a record was created.
    pub fn start(&mut self, id: AccountId, name: &str, map: &str) -> bool {
        if self.sessions.contains_key(&id) {
            return false;
        }
        self.sessions
            .insert(id, SessionRecord::new(name.to_string(), map.to_string()));
        true
    }

    pub fn record_round(&mut self, id: AccountId) {
        if let Some(record) = self.sessions.get_mut(&id) {
            record.add_round();
        }
    }

    pub fn record_opponent_count(&mut self, id: AccountId, count: u32) {
        if let Some(record) = self.sessions.get_mut(&id) {
            record.add_opponent_count(count);
        }
    }

    pub fn record_kill(&mut self, id: AccountId, is_knife: bool) {
        if let Some(record) = self.sessions.get_mut(&id) {
            record.add_kill(is_knife);
        }
    }

    pub fn record_death(&mut self, id: AccountId) {
        if let Some(record) = self.sessions.get_mut(&id) {
            record.add_death();
        }
    }

    /// Removes the session. Persisting it is the caller's job.
    pub fn end(&mut self, id: AccountId) -> Option<SessionRecord> {
        self.sessions.remove(&id)
    }

    /// Removes every session, in account order
    pub fn end_all(&mut self) -> Vec<(AccountId, SessionRecord)> {
        std::mem::take(&mut self.sessions).into_iter().collect()
    }

    pub fn get(&self, id: AccountId) -> Option<&SessionRecord> {
        self.sessions.get(&id)
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn all(&self) -> Vec<(AccountId, SessionRecord)> {
        self.sessions
            .iter()
            .map(|(id, record)| (*id, record.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
