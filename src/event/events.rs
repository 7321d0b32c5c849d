use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::shared::AccountId;

/// Team affiliation as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Unassigned,
    Spectator,
    Terrorist,
    CounterTerrorist,
}

impl Team {
    /// The side this team plays against, if it is a playing side
    pub fn opponent(self) -> Option<Team> {
        match self {
            Team::Terrorist => Some(Team::CounterTerrorist),
            Team::CounterTerrorist => Some(Team::Terrorist),
            Team::Unassigned | Team::Spectator => None,
        }
    }

    pub fn is_playing(self) -> bool {
        self.opponent().is_some()
    }
}

/// Snapshot of a connected client as seen by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub slot: u32,
    /// Authorized account identity; `None` for unauthenticated clients
    #[serde(default)]
    pub account_id: Option<AccountId>,
    pub name: String,
    pub team: Team,
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub bot: bool,
    /// Relay/observer clients (e.g. SourceTV)
    #[serde(default)]
    pub observer: bool,
}

impl PlayerInfo {
    /// Identity usable for statistics: authorized, human, not an observer
    pub fn tracked_identity(&self) -> Option<AccountId> {
        if self.bot || self.observer {
            return None;
        }
        self.account_id.filter(|id| *id > 0)
    }

    /// Identified player on a playing side
    pub fn is_participant(&self) -> bool {
        self.tracked_identity().is_some() && self.team.is_playing()
    }

    /// Identified participant that is currently alive
    pub fn is_active(&self) -> bool {
        self.is_participant() && self.alive
    }
}

/// Game lifecycle notifications consumed from the host
///
/// Events represent facts that already happened on the game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStart,
    RoundFreezeEnd,
    PlayerDeath {
        victim: Option<PlayerInfo>,
        #[serde(default)]
        attacker: Option<PlayerInfo>,
        weapon: String,
    },
    ClientDisconnect {
        slot: u32,
    },
    MapEnd,
}

impl GameEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::RoundStart => "round_start",
            GameEvent::RoundFreezeEnd => "round_freeze_end",
            GameEvent::PlayerDeath { .. } => "player_death",
            GameEvent::ClientDisconnect { .. } => "client_disconnect",
            GameEvent::MapEnd => "map_end",
        }
    }
}

/// Everything the host can hand to the statistics service
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    Event(GameEvent),
    /// "show my stats" issued from the client in `slot`
    ShowStats { slot: u32 },
    /// "show top N for this map" issued from the client in `slot`
    ShowTop { slot: u32 },
}

/// Weapon identifiers counted as knife kills
pub fn is_knife(weapon: &str) -> bool {
    let weapon = weapon.to_ascii_lowercase();
    weapon.contains("knife") || weapon.contains("bayonet")
}
