use std::sync::Arc;

use roundstats::feed::{self, FeedHost, FeedSource};
use roundstats::{StatsConfig, StatsService};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr; stdout carries player-facing output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roundstats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = StatsConfig::from_env()?;
    info!(
        primary_host = %config.primary.host,
        primary_database = %config.primary.database,
        write_mode = %config.primary.write_mode,
        sqlite_path = %config.sqlite_path,
        "Starting round stats tracker"
    );

    let host = Arc::new(FeedHost::stdout());
    let mut service = StatsService::from_config(&config, host.clone()).build();

    let (tx, rx) = mpsc::channel(256);
    let reader = tokio::spawn(feed::read_feed(BufReader::new(tokio::io::stdin()), tx));

    service.start(Box::new(FeedSource::new(host, rx))).await;
    service.run().await;
    service.stop().await;

    reader.await??;
    Ok(())
}
