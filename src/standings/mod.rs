pub mod handlers;
pub mod models;
pub mod service;

pub use models::{DriverStanding, StandingsResponse, TeamStanding};
pub use service::StandingsService;
