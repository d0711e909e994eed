use async_trait::async_trait;

use super::models::{Driver, DriverId, Race, RaceId, Season, SeasonId, Team, TeamId};
use crate::shared::AppError;

/// Trait for league catalogue operations: seasons, races, teams and drivers.
///
/// Result rows and penalties live behind their own traits; implementations
/// share a single backing store so the race deletion guard can see result
/// rows atomically.
#[async_trait]
pub trait LeagueRepository {
    async fn create_season(&self, season: &Season) -> Result<(), AppError>;
    async fn get_season(&self, season_id: SeasonId) -> Result<Option<Season>, AppError>;

    async fn create_race(&self, race: &Race) -> Result<(), AppError>;
    async fn get_race(&self, race_id: RaceId) -> Result<Option<Race>, AppError>;
    async fn list_races_in_season(&self, season_id: SeasonId) -> Result<Vec<Race>, AppError>;

    /// Deletes a race. A race that already has result rows is protected:
    /// the call fails with `Conflict` and leaves the race and rows untouched.
    async fn delete_race(&self, race_id: RaceId) -> Result<(), AppError>;

    async fn create_team(&self, team: &Team) -> Result<(), AppError>;
    async fn list_teams(&self) -> Result<Vec<Team>, AppError>;

    async fn create_driver(&self, driver: &Driver) -> Result<(), AppError>;
    async fn get_driver(&self, driver_id: DriverId) -> Result<Option<Driver>, AppError>;
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError>;

    /// Moves a driver to a new team (None makes them independent). Historical
    /// result rows are not rewritten; standings join through the current team.
    async fn set_driver_team(
        &self,
        driver_id: DriverId,
        team_id: Option<TeamId>,
    ) -> Result<(), AppError>;
}
