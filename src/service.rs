use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::commands;
use crate::config::StatsConfig;
use crate::event::{
    EventProjector, EventSource, GameEvent, GameHost, GateConfig, HostInput, StatsEvent,
    StatsObserver, TracingObserver,
};
use crate::leaderboard::QueryService;
use crate::persistence::{
    LocalStore, PersistOutcome, PersistenceGateway, PostgresStatsStore, PrimaryStore,
    SqliteStatsStore,
};
use crate::session::{SessionRecord, SessionStore};
use crate::shared::AccountId;

/// Owns the live sessions and ties host input to projection, persistence and queries
///
/// Everything runs on the task that drives [`StatsService::run`]; persistence
/// is awaited inline so a slow store delays the next event rather than racing it.
pub struct StatsService {
    sessions: SessionStore,
    projector: EventProjector,
    gateway: PersistenceGateway,
    queries: QueryService,
    host: Arc<dyn GameHost>,
    observer: Arc<dyn StatsObserver>,
    top_limit: u32,
    source: Option<Box<dyn EventSource>>,
}

impl StatsService {
    pub fn builder(
        primary: Arc<dyn PrimaryStore>,
        local: Arc<dyn LocalStore>,
        host: Arc<dyn GameHost>,
    ) -> StatsServiceBuilder {
        StatsServiceBuilder::new(primary, local, host)
    }

    /// PostgreSQL primary and SQLite local store as described by `config`
    pub fn from_config(config: &StatsConfig, host: Arc<dyn GameHost>) -> StatsServiceBuilder {
        let primary = Arc::new(PostgresStatsStore::connect_lazy(&config.primary));
        let local = Arc::new(SqliteStatsStore::open(&config.sqlite_path));
        StatsServiceBuilder::new(primary, local, host)
            .with_gates(GateConfig {
                min_players: config.min_players,
            })
            .with_top_limit(config.top_limit)
    }

    /// Wires the event source and syncs anything cached during a previous outage
    #[instrument(skip(self, source))]
    pub async fn start(&mut self, source: Box<dyn EventSource>) {
        info!(
            min_players = self.projector.gates().min_players,
            top_limit = self.top_limit,
            observer = self.observer.name(),
            "Starting stats service"
        );
        self.gateway.open().await;
        self.source = Some(source);
    }

    /// Processes host input until the source is exhausted or unwired
    pub async fn run(&mut self) {
        loop {
            let input = match self.source.as_mut() {
                Some(source) => source.next_input().await,
                None => None,
            };
            match input {
                Some(input) => self.handle_input(input).await,
                None => break,
            }
        }
        debug!("Event source exhausted");
    }

    /// Unwires the source, persists every live session and closes both stores
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Vec<(AccountId, PersistOutcome)> {
        self.source = None;
        let ended = self.sessions.end_all();
        let outcomes = self.persist_ended(ended).await;
        self.gateway.close().await;
        info!(persisted = outcomes.len(), "Stats service stopped");
        outcomes
    }

    pub async fn handle_input(&mut self, input: HostInput) {
        match input {
            HostInput::Event(event) => {
                self.handle_event(&event).await;
            }
            HostInput::ShowStats { slot } => self.show_stats(slot),
            HostInput::ShowTop { slot } => self.show_top(slot).await,
        }
    }

    /// Applies one game event; returns the persistence outcome of every session it ended
    pub async fn handle_event(&mut self, event: &GameEvent) -> Vec<(AccountId, PersistOutcome)> {
        debug!(event_type = event.event_type(), "Handling game event");
        let projection = self
            .projector
            .project(event, self.host.as_ref(), &mut self.sessions);

        for started in &projection.started {
            if let Some(record) = self.sessions.get(started.account_id) {
                self.observer.on_event(&StatsEvent::SessionStarted {
                    account_id: started.account_id,
                    name: record.name().to_string(),
                    map: record.map().to_string(),
                });
            }
            self.host
                .print_to_chat(started.slot, commands::SESSION_STARTED_MESSAGE);
        }

        self.persist_ended(projection.ended).await
    }

    async fn persist_ended(
        &self,
        ended: Vec<(AccountId, SessionRecord)>,
    ) -> Vec<(AccountId, PersistOutcome)> {
        let mut outcomes = Vec::with_capacity(ended.len());
        for (account_id, record) in ended {
            self.observer
                .on_event(&StatsEvent::SessionEnded { account_id });
            let outcome = self.gateway.persist(account_id, &record).await;
            outcomes.push((account_id, outcome));
        }
        outcomes
    }

    /// "show my stats": prints the caller's live session, or nothing without one
    pub fn show_stats(&self, slot: u32) {
        let Some(record) = self
            .host
            .player_in_slot(slot)
            .and_then(|player| player.tracked_identity())
            .and_then(|id| self.sessions.get(id))
        else {
            return;
        };

        for line in commands::session_lines(record) {
            self.host.print_to_console(slot, &line);
        }
    }

    /// "show top N for this map"
    pub async fn show_top(&self, slot: u32) {
        let map = self.host.current_map();
        let leaderboard = self.queries.top_by_kills(&map, self.top_limit).await;
        for line in commands::leaderboard_lines(&map, &leaderboard) {
            self.host.print_to_console(slot, &line);
        }
    }

    pub fn session(&self, account_id: AccountId) -> Option<&SessionRecord> {
        self.sessions.get(account_id)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }
}

pub struct StatsServiceBuilder {
    primary: Arc<dyn PrimaryStore>,
    local: Arc<dyn LocalStore>,
    host: Arc<dyn GameHost>,
    observer: Arc<dyn StatsObserver>,
    gates: GateConfig,
    top_limit: u32,
}

impl StatsServiceBuilder {
    fn new(
        primary: Arc<dyn PrimaryStore>,
        local: Arc<dyn LocalStore>,
        host: Arc<dyn GameHost>,
    ) -> Self {
        Self {
            primary,
            local,
            host,
            observer: Arc::new(TracingObserver),
            gates: GateConfig::default(),
            top_limit: StatsConfig::default().top_limit,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn StatsObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_gates(mut self, gates: GateConfig) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_top_limit(mut self, top_limit: u32) -> Self {
        self.top_limit = top_limit;
        self
    }

    pub fn build(self) -> StatsService {
        let gateway = PersistenceGateway::new(
            self.primary.clone(),
            self.local,
            self.observer.clone(),
        );
        let queries = QueryService::new(self.primary, self.observer.clone());

        StatsService {
            sessions: SessionStore::new(),
            projector: EventProjector::new(self.gates),
            gateway,
            queries,
            host: self.host,
            observer: self.observer,
            top_limit: self.top_limit,
            source: None,
        }
    }
}
