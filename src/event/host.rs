use async_trait::async_trait;
use tokio::sync::mpsc;

use super::events::{HostInput, PlayerInfo};

/// Read access to the game server plus its player-facing output
///
/// Implemented by whatever embeds the statistics service. All calls happen on
/// the event-handling task, so implementations only need to be cheap.
pub trait GameHost: Send + Sync {
    /// Every currently connected client
    fn players(&self) -> Vec<PlayerInfo>;

    fn player_in_slot(&self, slot: u32) -> Option<PlayerInfo> {
        self.players().into_iter().find(|p| p.slot == slot)
    }

    fn current_map(&self) -> String;

    fn is_warmup(&self) -> bool;

    fn print_to_chat(&self, slot: u32, message: &str);

    fn print_to_console(&self, slot: u32, line: &str);
}

/// Supplies host input to the service until the host goes away
#[async_trait]
pub trait EventSource: Send {
    /// Next input, or `None` once the source is exhausted
    async fn next_input(&mut self) -> Option<HostInput>;
}

#[async_trait]
impl EventSource for mpsc::Receiver<HostInput> {
    async fn next_input(&mut self) -> Option<HostInput> {
        self.recv().await
    }
}
