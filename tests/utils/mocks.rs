use std::sync::{Mutex, RwLock};

use roundstats::{GameHost, PlayerInfo, StatsEvent, StatsObserver, Team};

// ============================================================================
// Mock Infrastructure
// ============================================================================

pub fn player(slot: u32, account_id: u32, team: Team) -> PlayerInfo {
    PlayerInfo {
        slot,
        account_id: Some(account_id),
        name: format!("player-{}", slot),
        team,
        alive: true,
        bot: false,
        observer: false,
    }
}

#[derive(Default)]
struct HostState {
    map: String,
    warmup: bool,
    players: Vec<PlayerInfo>,
}

/// Game host whose roster and phase are set directly by the test
#[derive(Default)]
pub struct ScriptedHost {
    state: RwLock<HostState>,
    chat: Mutex<Vec<(u32, String)>>,
    console: Mutex<Vec<(u32, String)>>,
}

impl ScriptedHost {
    pub fn new(map: &str, players: Vec<PlayerInfo>) -> Self {
        Self {
            state: RwLock::new(HostState {
                map: map.to_string(),
                warmup: false,
                players,
            }),
            ..Self::default()
        }
    }

    pub fn set_warmup(&self, warmup: bool) {
        self.state.write().unwrap().warmup = warmup;
    }

    pub fn set_map(&self, map: &str) {
        self.state.write().unwrap().map = map.to_string();
    }

    pub fn remove_player(&self, slot: u32) {
        self.state.write().unwrap().players.retain(|p| p.slot != slot);
    }

    pub fn add_player(&self, player: PlayerInfo) {
        self.state.write().unwrap().players.push(player);
    }

    pub fn chat_for(&self, slot: u32) -> Vec<String> {
        self.chat
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn console_for(&self, slot: u32) -> Vec<String> {
        self.console
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl GameHost for ScriptedHost {
    fn players(&self) -> Vec<PlayerInfo> {
        self.state.read().unwrap().players.clone()
    }

    fn current_map(&self) -> String {
        self.state.read().unwrap().map.clone()
    }

    fn is_warmup(&self) -> bool {
        self.state.read().unwrap().warmup
    }

    fn print_to_chat(&self, slot: u32, message: &str) {
        self.chat.lock().unwrap().push((slot, message.to_string()));
    }

    fn print_to_console(&self, slot: u32, line: &str) {
        self.console.lock().unwrap().push((slot, line.to_string()));
    }
}

/// Observer that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StatsEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<StatsEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&StatsEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

impl StatsObserver for RecordingObserver {
    fn on_event(&self, event: &StatsEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "RecordingObserver"
    }
}
