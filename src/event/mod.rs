// Event-driven notification plumbing
//
// Services emit facts after each committed write; the bus fans them
// out to any interested subscribers (logging, future integrations).

pub mod bus;
pub mod events;

pub use bus::EventBus;
pub use events::LeagueEvent;
