// Library crate for the league results and standings server
// This file exposes the public API for integration tests

pub mod event;
pub mod league;
pub mod penalties;
pub mod results;
pub mod shared;
pub mod standings;
pub mod store;

// Re-export commonly used types for easier access in tests
pub use event::{EventBus, LeagueEvent};
pub use league::{Driver, LeagueRepository, Race, RaceStatus, Season, Team};
pub use penalties::{Penalty, PenaltyRepository, PenaltyService, PenaltyType};
pub use results::{ResultRow, ResultsRepository, ResultsService};
pub use shared::{AppError, AppState};
pub use standings::StandingsService;
pub use store::{InMemoryStore, PostgresStore};
