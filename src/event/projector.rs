use std::collections::HashMap;

use super::events::{is_knife, GameEvent, PlayerInfo, Team};
use super::host::GameHost;
use crate::session::{SessionRecord, SessionStore};
use crate::shared::AccountId;

/// Eligibility thresholds applied before sessions are mutated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateConfig {
    /// Minimum alive, identified, playing participants; 0 disables the gate
    pub min_players: usize,
}

/// A session created while projecting an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    pub account_id: AccountId,
    pub slot: u32,
}

/// What projecting one event did to the session store
#[derive(Debug, Default)]
pub struct Projection {
    pub started: Vec<StartedSession>,
    /// Sessions removed from the store that still need persisting
    pub ended: Vec<(AccountId, SessionRecord)>,
}

impl Projection {
    fn ended(ended: Vec<(AccountId, SessionRecord)>) -> Self {
        Self {
            started: Vec::new(),
            ended,
        }
    }
}

/// Translates host events into [`SessionStore`] mutations
///
/// Two gates apply to round and death events:
/// - the session gate needs enough active participants before any session is touched
/// - the statistics gate (closed during warm-up) still lets sessions start but
///   suppresses rounds, opponents, kills and deaths
///
/// Disconnects and map end always tear sessions down regardless of gates.
#[derive(Debug, Clone, Default)]
pub struct EventProjector {
    gates: GateConfig,
}

impl EventProjector {
    pub fn new(gates: GateConfig) -> Self {
        Self { gates }
    }

    pub fn gates(&self) -> GateConfig {
        self.gates
    }

    pub fn project(
        &self,
        event: &GameEvent,
        host: &dyn GameHost,
        sessions: &mut SessionStore,
    ) -> Projection {
        match event {
            GameEvent::RoundStart => self.on_round_start(host, sessions),
            GameEvent::RoundFreezeEnd => {
                self.on_round_freeze_end(host, sessions);
                Projection::default()
            }
            GameEvent::PlayerDeath {
                victim,
                attacker,
                weapon,
            } => {
                self.on_player_death(host, sessions, victim.as_ref(), attacker.as_ref(), weapon);
                Projection::default()
            }
            GameEvent::ClientDisconnect { slot } => {
                let ended = host
                    .player_in_slot(*slot)
                    .and_then(|player| player.tracked_identity())
                    .and_then(|id| sessions.end(id).map(|record| (id, record)));
                Projection::ended(ended.into_iter().collect())
            }
            GameEvent::MapEnd => Projection::ended(sessions.end_all()),
        }
    }

    fn session_gate_open(&self, players: &[PlayerInfo]) -> bool {
        self.gates.min_players == 0
            || players.iter().filter(|p| p.is_active()).count() >= self.gates.min_players
    }

    fn on_round_start(&self, host: &dyn GameHost, sessions: &mut SessionStore) -> Projection {
        let players = host.players();
        let mut projection = Projection::default();
        if !self.session_gate_open(&players) {
            return projection;
        }

        let stats_open = !host.is_warmup();
        let map = host.current_map();

        for player in players.iter().filter(|p| p.is_active()) {
            let Some(id) = player.tracked_identity() else {
                continue;
            };

            if sessions.contains(id) {
                if stats_open {
                    sessions.record_round(id);
                }
            } else if sessions.start(id, &player.name, &map) {
                projection.started.push(StartedSession {
                    account_id: id,
                    slot: player.slot,
                });
            }
        }

        projection
    }

    fn on_round_freeze_end(&self, host: &dyn GameHost, sessions: &mut SessionStore) {
        let players = host.players();
        if !self.session_gate_open(&players) || host.is_warmup() {
            return;
        }

        let mut headcount: HashMap<Team, u32> = HashMap::new();
        for player in players.iter().filter(|p| p.is_participant()) {
            *headcount.entry(player.team).or_default() += 1;
        }

        for player in players.iter().filter(|p| p.is_participant()) {
            let (Some(id), Some(opponent)) = (player.tracked_identity(), player.team.opponent())
            else {
                continue;
            };
            let opponents = headcount.get(&opponent).copied().unwrap_or_default();
            sessions.record_opponent_count(id, opponents);
        }
    }

    fn on_player_death(
        &self,
        host: &dyn GameHost,
        sessions: &mut SessionStore,
        victim: Option<&PlayerInfo>,
        attacker: Option<&PlayerInfo>,
        weapon: &str,
    ) {
        if !self.session_gate_open(&host.players()) || host.is_warmup() {
            return;
        }

        let victim_id = victim.and_then(PlayerInfo::tracked_identity);
        if let Some(id) = victim_id {
            sessions.record_death(id);
        }

        let attacker_id = attacker
            .and_then(PlayerInfo::tracked_identity)
            .filter(|id| Some(*id) != victim_id);
        if let Some(id) = attacker_id {
            sessions.record_kill(id, is_knife(weapon));
        }
    }
}
