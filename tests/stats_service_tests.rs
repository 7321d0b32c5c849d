mod utils;

use roundstats::event::CacheReason;
use roundstats::{GameEvent, HostInput, PersistOutcome, StatsEvent, Team};
use tokio::sync::mpsc;
use utils::{player, TestSetupBuilder};

fn kill(victim_slot: u32, attacker_slot: u32, weapon: &str) -> GameEvent {
    let victim_team = if victim_slot <= 2 {
        Team::Terrorist
    } else {
        Team::CounterTerrorist
    };
    let attacker_team = if attacker_slot <= 2 {
        Team::Terrorist
    } else {
        Team::CounterTerrorist
    };
    GameEvent::PlayerDeath {
        victim: Some(player(victim_slot, 100 + victim_slot, victim_team)),
        attacker: Some(player(attacker_slot, 100 + attacker_slot, attacker_team)),
        weapon: weapon.to_string(),
    }
}

#[tokio::test]
async fn tracks_a_player_from_first_round_to_disconnect() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();

    setup.service.handle_event(&GameEvent::RoundStart).await;
    assert_eq!(setup.service.sessions().len(), 4);
    assert_eq!(
        setup.host.chat_for(1),
        vec!["[Stats] Your statistics are now being recorded.".to_string()]
    );

    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&GameEvent::RoundFreezeEnd).await;
    setup.service.handle_event(&kill(3, 1, "ak47")).await;
    setup.service.handle_event(&kill(4, 1, "knife")).await;

    let record = setup.service.session(101).expect("session should exist");
    assert_eq!(record.rounds(), 1);
    assert_eq!(record.kills(), 2);
    assert_eq!(record.knife_kills(), 1);
    assert_eq!(record.average_opponents(), 2.0);
    assert_eq!(setup.service.session(103).unwrap().deaths(), 1);

    let outcomes = setup
        .service
        .handle_event(&GameEvent::ClientDisconnect { slot: 1 })
        .await;

    assert_eq!(outcomes, vec![(101, PersistOutcome::Stored)]);
    assert!(setup.service.session(101).is_none());

    let rows = setup.primary.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account_id, 101);
    assert_eq!(rows[0].kills, 2);
    assert_eq!(rows[0].knives, 1);
    assert_eq!(rows[0].map, "de_dust2");
}

#[tokio::test]
async fn outage_caches_sessions_until_primary_returns() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.service.handle_event(&GameEvent::RoundStart).await;

    setup.primary.set_available(false);
    let outcomes = setup
        .service
        .handle_event(&GameEvent::ClientDisconnect { slot: 1 })
        .await;

    assert_eq!(
        outcomes,
        vec![(101, PersistOutcome::Cached(CacheReason::PrimaryDown))]
    );
    assert_eq!(setup.local.rows().await.len(), 1);
    assert!(setup.primary.rows().await.is_empty());

    setup.primary.set_available(true);
    setup
        .service
        .handle_event(&GameEvent::ClientDisconnect { slot: 2 })
        .await;

    let ids: Vec<u32> = setup.primary.rows().await.iter().map(|r| r.account_id).collect();
    assert_eq!(ids, vec![102, 101]);
    assert!(setup.local.rows().await.is_empty());
    assert_eq!(
        setup
            .observer
            .count(|e| matches!(e, StatsEvent::Reconciled { rows: 1 })),
        1
    );
}

#[tokio::test]
async fn map_end_persists_and_clears_every_session() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.service.handle_event(&GameEvent::RoundStart).await;

    let outcomes = setup.service.handle_event(&GameEvent::MapEnd).await;

    assert_eq!(outcomes.len(), 4);
    assert!(setup.service.sessions().all().is_empty());
    assert_eq!(setup.primary.rows().await.len(), 4);
}

#[tokio::test]
async fn sessions_are_dropped_even_when_nothing_can_be_stored() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.primary.set_available(false);
    setup.local.set_available(false);

    let outcomes = setup
        .service
        .handle_event(&GameEvent::ClientDisconnect { slot: 3 })
        .await;

    assert_eq!(outcomes, vec![(103, PersistOutcome::Lost)]);
    assert!(setup.service.session(103).is_none());
    assert_eq!(
        setup
            .observer
            .count(|e| matches!(e, StatsEvent::PersistFailed { account_id: 103, .. })),
        1
    );
}

#[tokio::test]
async fn reconnecting_player_starts_a_fresh_session() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&kill(3, 1, "ak47")).await;
    setup
        .service
        .handle_event(&GameEvent::ClientDisconnect { slot: 1 })
        .await;
    setup.host.remove_player(1);

    setup.host.add_player(player(5, 101, Team::Terrorist));
    setup.service.handle_event(&GameEvent::RoundStart).await;

    let record = setup.service.session(101).unwrap();
    assert_eq!(record.kills(), 0);
    assert_eq!(record.rounds(), 0);
}

#[tokio::test]
async fn minimum_player_gate_holds_back_tracking() {
    let mut setup = TestSetupBuilder::new()
        .with_four_players()
        .with_min_players(5)
        .build();

    setup.service.handle_event(&GameEvent::RoundStart).await;
    assert!(setup.service.sessions().is_empty());

    setup.host.add_player(player(5, 105, Team::Terrorist));
    setup.service.handle_event(&GameEvent::RoundStart).await;
    assert_eq!(setup.service.sessions().len(), 5);
}

#[tokio::test]
async fn warmup_keeps_sessions_but_not_statistics() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.host.set_warmup(true);

    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&kill(3, 1, "ak47")).await;

    let record = setup.service.session(101).unwrap();
    assert_eq!(record.rounds(), 0);
    assert_eq!(record.kills(), 0);

    setup.host.set_warmup(false);
    setup.service.handle_event(&kill(3, 1, "ak47")).await;
    assert_eq!(setup.service.session(101).unwrap().kills(), 1);
}

#[tokio::test]
async fn show_stats_prints_live_session_only() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();

    setup.service.show_stats(1);
    assert!(setup.host.console_for(1).is_empty());

    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&kill(3, 1, "ak47")).await;
    setup.service.show_stats(1);

    let lines = setup.host.console_for(1);
    assert_eq!(lines[0], "Stats:");
    assert!(lines.contains(&"Kills: 1".to_string()));
    assert!(lines.contains(&"Map: de_dust2".to_string()));
}

#[tokio::test]
async fn show_top_ranks_current_map() {
    let mut setup = TestSetupBuilder::new()
        .with_four_players()
        .with_top_limit(2)
        .build();
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&kill(3, 1, "ak47")).await;
    setup.service.handle_event(&kill(4, 1, "ak47")).await;
    setup.service.handle_event(&kill(1, 2, "ak47")).await;
    setup.service.handle_event(&GameEvent::MapEnd).await;

    setup.service.show_top(2).await;

    let lines = setup.host.console_for(2);
    assert_eq!(lines[0], "Top 2 on de_dust2:");
    assert_eq!(lines.len(), 4);
    assert!(lines[2].contains("player-1"));
    assert!(lines[3].contains("player-2"));
}

#[tokio::test]
async fn show_top_reports_empty_and_unavailable() {
    let setup = TestSetupBuilder::new().with_four_players().build();

    setup.service.show_top(1).await;
    setup.primary.set_available(false);
    setup.service.show_top(1).await;

    let lines = setup.host.console_for(1);
    assert_eq!(
        lines,
        vec![
            "[Stats] No statistics recorded for this map yet.".to_string(),
            "[Stats] The leaderboard is unavailable right now, try again later.".to_string(),
        ]
    );
    assert_eq!(
        setup
            .observer
            .count(|e| matches!(e, StatsEvent::LeaderboardUnavailable { .. })),
        1
    );
}

#[tokio::test]
async fn map_change_keeps_live_session_map_and_moves_leaderboard() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.service.handle_event(&kill(3, 1, "ak47")).await;
    setup.service.handle_event(&GameEvent::MapEnd).await;

    setup.host.set_map("de_nuke");
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.host.set_map("de_mirage");
    setup.service.handle_event(&GameEvent::RoundStart).await;

    let record = setup.service.session(101).unwrap();
    assert_eq!(record.map(), "de_nuke");
    assert_eq!(record.rounds(), 1);

    setup.service.show_top(1).await;
    assert_eq!(
        setup.host.console_for(1),
        vec!["[Stats] No statistics recorded for this map yet.".to_string()]
    );
}

#[tokio::test]
async fn run_consumes_source_and_stop_flushes_sessions() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    let (tx, rx) = mpsc::channel(16);

    setup.service.start(Box::new(rx)).await;
    assert!(setup.service.is_running());

    tx.send(HostInput::Event(GameEvent::RoundStart)).await.unwrap();
    tx.send(HostInput::Event(kill(3, 1, "ak47"))).await.unwrap();
    tx.send(HostInput::ShowStats { slot: 1 }).await.unwrap();
    drop(tx);

    setup.service.run().await;
    assert_eq!(setup.service.sessions().len(), 4);
    assert!(setup.host.console_for(1).contains(&"Kills: 1".to_string()));

    let outcomes = setup.service.stop().await;

    assert_eq!(outcomes.len(), 4);
    assert!(!setup.service.is_running());
    assert!(setup.service.sessions().is_empty());
    assert_eq!(setup.primary.rows().await.len(), 4);
    assert_eq!(
        setup
            .observer
            .count(|e| matches!(e, StatsEvent::StoreClosed { .. })),
        2
    );
}

#[tokio::test]
async fn start_syncs_rows_cached_before_load() {
    let mut setup = TestSetupBuilder::new().with_four_players().build();
    setup.service.handle_event(&GameEvent::RoundStart).await;
    setup.primary.set_available(false);
    setup.service.handle_event(&GameEvent::MapEnd).await;
    assert_eq!(setup.local.rows().await.len(), 4);

    setup.primary.set_available(true);
    let (_tx, rx) = mpsc::channel::<HostInput>(1);
    setup.service.start(Box::new(rx)).await;

    assert_eq!(setup.primary.rows().await.len(), 4);
    assert!(setup.local.rows().await.is_empty());
}
