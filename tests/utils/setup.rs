use std::sync::Arc;

use roundstats::event::GateConfig;
use roundstats::{InMemoryLocalStore, InMemoryPrimaryStore, StatsService, Team, WriteMode};

use super::mocks::{player, RecordingObserver, ScriptedHost};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub service: StatsService,
    pub host: Arc<ScriptedHost>,
    pub primary: Arc<InMemoryPrimaryStore>,
    pub local: Arc<InMemoryLocalStore>,
    pub observer: Arc<RecordingObserver>,
}

pub struct TestSetupBuilder {
    map: String,
    players: Vec<(u32, u32, Team)>,
    min_players: usize,
    top_limit: u32,
    mode: WriteMode,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            map: "de_dust2".to_string(),
            players: vec![],
            min_players: 0,
            top_limit: 10,
            mode: WriteMode::Append,
        }
    }

    /// Slots 1-2 terrorists (accounts 101-102), slots 3-4 counter-terrorists (103-104)
    pub fn with_four_players(mut self) -> Self {
        self.players = vec![
            (1, 101, Team::Terrorist),
            (2, 102, Team::Terrorist),
            (3, 103, Team::CounterTerrorist),
            (4, 104, Team::CounterTerrorist),
        ];
        self
    }

    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players;
        self
    }

    pub fn with_top_limit(mut self, top_limit: u32) -> Self {
        self.top_limit = top_limit;
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> TestSetup {
        let players = self
            .players
            .iter()
            .map(|(slot, account, team)| player(*slot, *account, *team))
            .collect();
        let host = Arc::new(ScriptedHost::new(&self.map, players));
        let primary = Arc::new(InMemoryPrimaryStore::new(self.mode));
        let local = Arc::new(InMemoryLocalStore::new());
        let observer = Arc::new(RecordingObserver::default());

        let service = StatsService::builder(primary.clone(), local.clone(), host.clone())
            .with_observer(observer.clone())
            .with_gates(GateConfig {
                min_players: self.min_players,
            })
            .with_top_limit(self.top_limit)
            .build();

        TestSetup {
            service,
            host,
            primary,
            local,
            observer,
        }
    }
}
