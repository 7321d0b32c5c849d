//! Line-oriented JSON host used by the `roundstats` binary.
//!
//! Each input line is one [`FeedLine`]. Roster lines replace the simulated
//! server state; every other line becomes a [`HostInput`] for the service.

use async_trait::async_trait;
use serde::Deserialize;
use std::io::Write;
use std::sync::{Mutex, RwLock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::{EventSource, GameEvent, GameHost, HostInput, PlayerInfo};
use crate::shared::StatsError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedLine {
    Roster {
        map: String,
        #[serde(default)]
        warmup: bool,
        #[serde(default)]
        players: Vec<PlayerInfo>,
    },
    Event {
        event: GameEvent,
    },
    Stats {
        slot: u32,
    },
    Top {
        slot: u32,
    },
}

impl FeedLine {
    pub fn parse(line: &str) -> Result<Self, StatsError> {
        serde_json::from_str(line)
            .map_err(|e| StatsError::Validation(format!("Invalid feed line: {}", e)))
    }
}

#[derive(Debug, Default)]
struct ServerState {
    map: String,
    warmup: bool,
    players: Vec<PlayerInfo>,
}

/// [`GameHost`] backed by roster lines, writing player output to a sink
pub struct FeedHost {
    state: RwLock<ServerState>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl FeedHost {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            state: RwLock::new(ServerState::default()),
            output: Mutex::new(output),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Applies a roster line, or converts any other line into service input
    pub fn apply(&self, line: FeedLine) -> Option<HostInput> {
        match line {
            FeedLine::Roster {
                map,
                warmup,
                players,
            } => {
                debug!(map = %map, warmup, players = players.len(), "Roster updated");
                let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
                *state = ServerState {
                    map,
                    warmup,
                    players,
                };
                None
            }
            FeedLine::Event { event } => Some(HostInput::Event(event)),
            FeedLine::Stats { slot } => Some(HostInput::ShowStats { slot }),
            FeedLine::Top { slot } => Some(HostInput::ShowTop { slot }),
        }
    }

    fn emit(&self, channel: &str, slot: u32, text: &str) {
        let mut output = self.output.lock().unwrap_or_else(|p| p.into_inner());
        let _ = writeln!(output, "[{} {}] {}", channel, slot, text);
    }
}

impl GameHost for FeedHost {
    fn players(&self) -> Vec<PlayerInfo> {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .players
            .clone()
    }

    fn current_map(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .map
            .clone()
    }

    fn is_warmup(&self) -> bool {
        self.state.read().unwrap_or_else(|p| p.into_inner()).warmup
    }

    fn print_to_chat(&self, slot: u32, message: &str) {
        self.emit("chat", slot, message);
    }

    fn print_to_console(&self, slot: u32, line: &str) {
        self.emit("console", slot, line);
    }
}

/// Event source that applies roster lines in order with the events around them
pub struct FeedSource {
    host: std::sync::Arc<FeedHost>,
    lines: mpsc::Receiver<FeedLine>,
}

impl FeedSource {
    pub fn new(host: std::sync::Arc<FeedHost>, lines: mpsc::Receiver<FeedLine>) -> Self {
        Self { host, lines }
    }
}

#[async_trait]
impl EventSource for FeedSource {
    async fn next_input(&mut self) -> Option<HostInput> {
        while let Some(line) = self.lines.recv().await {
            if let Some(input) = self.host.apply(line) {
                return Some(input);
            }
        }
        None
    }
}

/// Forwards feed lines from `reader` until EOF or until the receiver is gone
///
/// Lines that are not UTF-8 or not a valid [`FeedLine`] are logged and skipped.
pub async fn read_feed<R>(reader: R, tx: mpsc::Sender<FeedLine>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');
    while let Some(bytes) = segments.next_segment().await? {
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Skipping feed line that is not UTF-8");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match FeedLine::parse(line.trim()) {
            Ok(feed_line) => {
                if tx.send(feed_line).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Skipping feed line"),
        }
    }
    Ok(())
}
