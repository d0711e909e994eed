use tokio::sync::broadcast;
use tracing::debug;

use super::events::LeagueEvent;

/// Event bus for distributing events throughout the application
///
/// A single broadcast channel carries every league event; subscribers
/// filter on the variants they care about.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LeagueEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emits an event to all current subscribers
    pub fn emit(&self, event: LeagueEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(event_type, receivers = receiver_count, "League event emitted");
            }
            Err(_) => {
                debug!(event_type, "League event emitted with no receivers");
            }
        }
    }

    /// Subscribe to all league events
    pub fn subscribe(&self) -> broadcast::Receiver<LeagueEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
