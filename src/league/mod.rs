pub mod models;
pub mod repository;

pub use models::{Driver, DriverId, Race, RaceId, RaceStatus, Season, SeasonId, Team, TeamId};
pub use repository::LeagueRepository;
