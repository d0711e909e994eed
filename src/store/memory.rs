use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::league::models::{Driver, DriverId, Race, RaceId, RaceStatus, Season, SeasonId, Team, TeamId};
use crate::league::repository::LeagueRepository;
use crate::penalties::models::{Penalty, PenaltyId};
use crate::penalties::repository::PenaltyRepository;
use crate::results::models::ResultRow;
use crate::results::repository::ResultsRepository;
use crate::shared::AppError;

#[derive(Default)]
struct StoreState {
    seasons: HashMap<SeasonId, Season>,
    races: HashMap<RaceId, Race>,
    teams: HashMap<TeamId, Team>,
    drivers: HashMap<DriverId, Driver>,
    rows: HashMap<(RaceId, DriverId), ResultRow>,
    penalties: HashMap<PenaltyId, Penalty>,
}

/// In-memory implementation of the league, results and penalty repositories
/// for development and testing
///
/// One store backs all three traits, with a single lock over the whole
/// state. That makes the cross-aggregate writes (replace rows + mark race
/// completed, insert penalty + mutate row) genuinely atomic, matching the
/// transaction boundaries of the Postgres implementation. Data is lost when
/// the application restarts.
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Returns the current number of result rows (useful for debugging)
    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }
}

fn sort_race_rows(rows: &mut [ResultRow]) {
    // Classified finishers first in position order, unclassified last.
    rows.sort_by_key(|row| (row.position.is_none(), row.position, row.driver_id));
}

#[async_trait]
impl LeagueRepository for InMemoryStore {
    #[instrument(skip(self, season))]
    async fn create_season(&self, season: &Season) -> Result<(), AppError> {
        debug!(season_id = season.id, name = %season.name, "Creating season in memory");

        let mut state = self.state.lock().unwrap();
        if state.seasons.contains_key(&season.id) {
            warn!(season_id = season.id, "Season already exists in memory");
            return Err(AppError::Conflict("Season already exists".to_string()));
        }
        state.seasons.insert(season.id, season.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_season(&self, season_id: SeasonId) -> Result<Option<Season>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.seasons.get(&season_id).cloned())
    }

    #[instrument(skip(self, race))]
    async fn create_race(&self, race: &Race) -> Result<(), AppError> {
        debug!(race_id = race.id, season_id = race.season_id, "Creating race in memory");

        let mut state = self.state.lock().unwrap();
        if !state.seasons.contains_key(&race.season_id) {
            warn!(season_id = race.season_id, "Season not found for race in memory");
            return Err(AppError::NotFound("Season not found".to_string()));
        }
        if state.races.contains_key(&race.id) {
            warn!(race_id = race.id, "Race already exists in memory");
            return Err(AppError::Conflict("Race already exists".to_string()));
        }
        state.races.insert(race.id, race.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_race(&self, race_id: RaceId) -> Result<Option<Race>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.races.get(&race_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_races_in_season(&self, season_id: SeasonId) -> Result<Vec<Race>, AppError> {
        let state = self.state.lock().unwrap();
        let mut races: Vec<Race> = state
            .races
            .values()
            .filter(|race| race.season_id == season_id)
            .cloned()
            .collect();
        races.sort_by_key(|race| race.scheduled_at);
        Ok(races)
    }

    #[instrument(skip(self))]
    async fn delete_race(&self, race_id: RaceId) -> Result<(), AppError> {
        debug!(race_id, "Deleting race from memory");

        let mut state = self.state.lock().unwrap();
        if !state.races.contains_key(&race_id) {
            warn!(race_id, "Race not found for deletion in memory");
            return Err(AppError::NotFound("Race not found".to_string()));
        }

        let row_count = state.rows.keys().filter(|(rid, _)| *rid == race_id).count();
        if row_count > 0 {
            warn!(race_id, row_count, "Refusing to delete race with recorded results");
            return Err(AppError::Conflict(
                "Race has recorded results and cannot be deleted".to_string(),
            ));
        }

        state.races.remove(&race_id);
        debug!(race_id, "Race deleted from memory");
        Ok(())
    }

    #[instrument(skip(self, team))]
    async fn create_team(&self, team: &Team) -> Result<(), AppError> {
        debug!(team_id = team.id, name = %team.name, "Creating team in memory");

        let mut state = self.state.lock().unwrap();
        if state.teams.contains_key(&team.id) {
            warn!(team_id = team.id, "Team already exists in memory");
            return Err(AppError::Conflict("Team already exists".to_string()));
        }
        state.teams.insert(team.id, team.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let state = self.state.lock().unwrap();
        let mut teams: Vec<Team> = state.teams.values().cloned().collect();
        teams.sort_by_key(|team| team.id);
        Ok(teams)
    }

    #[instrument(skip(self, driver))]
    async fn create_driver(&self, driver: &Driver) -> Result<(), AppError> {
        debug!(driver_id = driver.id, name = %driver.name, "Creating driver in memory");

        let mut state = self.state.lock().unwrap();
        if state.drivers.contains_key(&driver.id) {
            warn!(driver_id = driver.id, "Driver already exists in memory");
            return Err(AppError::Conflict("Driver already exists".to_string()));
        }
        if let Some(team_id) = driver.team_id {
            if !state.teams.contains_key(&team_id) {
                warn!(driver_id = driver.id, team_id, "Team not found for driver in memory");
                return Err(AppError::NotFound("Team not found".to_string()));
            }
        }
        state.drivers.insert(driver.id, driver.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_driver(&self, driver_id: DriverId) -> Result<Option<Driver>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.drivers.get(&driver_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let state = self.state.lock().unwrap();
        let mut drivers: Vec<Driver> = state.drivers.values().cloned().collect();
        drivers.sort_by_key(|driver| driver.id);
        Ok(drivers)
    }

    #[instrument(skip(self))]
    async fn set_driver_team(
        &self,
        driver_id: DriverId,
        team_id: Option<TeamId>,
    ) -> Result<(), AppError> {
        debug!(driver_id, ?team_id, "Moving driver to team in memory");

        let mut state = self.state.lock().unwrap();
        if let Some(new_team) = team_id {
            if !state.teams.contains_key(&new_team) {
                warn!(driver_id, team_id = new_team, "Team not found for move in memory");
                return Err(AppError::NotFound("Team not found".to_string()));
            }
        }
        match state.drivers.get_mut(&driver_id) {
            Some(driver) => {
                driver.team_id = team_id;
                Ok(())
            }
            None => {
                warn!(driver_id, "Driver not found for team move in memory");
                Err(AppError::NotFound("Driver not found".to_string()))
            }
        }
    }
}

#[async_trait]
impl ResultsRepository for InMemoryStore {
    #[instrument(skip(self, rows))]
    async fn replace_race_results(
        &self,
        race_id: RaceId,
        rows: &[ResultRow],
    ) -> Result<(), AppError> {
        debug!(race_id, entries = rows.len(), "Replacing race results in memory");

        // Single lock over delete + insert + status change; readers see
        // either the old sheet or the full new one, never a mixture.
        let mut state = self.state.lock().unwrap();
        if !state.races.contains_key(&race_id) {
            warn!(race_id, "Race not found for result replacement in memory");
            return Err(AppError::NotFound("Race not found".to_string()));
        }

        state.rows.retain(|(rid, _), _| *rid != race_id);
        for row in rows {
            state.rows.insert((row.race_id, row.driver_id), row.clone());
        }
        if let Some(race) = state.races.get_mut(&race_id) {
            race.status = RaceStatus::Completed;
        }

        debug!(race_id, entries = rows.len(), "Race results replaced in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rows_for_race(&self, race_id: RaceId) -> Result<Vec<ResultRow>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<ResultRow> = state
            .rows
            .values()
            .filter(|row| row.race_id == race_id)
            .cloned()
            .collect();
        sort_race_rows(&mut rows);
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn rows_for_season(&self, season_id: SeasonId) -> Result<Vec<ResultRow>, AppError> {
        let state = self.state.lock().unwrap();
        let race_ids: Vec<RaceId> = state
            .races
            .values()
            .filter(|race| race.season_id == season_id)
            .map(|race| race.id)
            .collect();
        let rows = state
            .rows
            .values()
            .filter(|row| race_ids.contains(&row.race_id))
            .cloned()
            .collect();
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn get_row(
        &self,
        race_id: RaceId,
        driver_id: DriverId,
    ) -> Result<Option<ResultRow>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.rows.get(&(race_id, driver_id)).cloned())
    }
}

#[async_trait]
impl PenaltyRepository for InMemoryStore {
    #[instrument(skip(self, penalty))]
    async fn apply(&self, penalty: &Penalty) -> Result<(), AppError> {
        debug!(
            penalty_id = %penalty.id,
            driver_id = penalty.driver_id,
            penalty_type = %penalty.penalty_type,
            "Applying penalty in memory"
        );

        let mut state = self.state.lock().unwrap();

        // Mutate the row first so a missing row leaves no ledger record.
        if penalty.deducts_points() {
            let race_id = penalty.race_id.unwrap_or_default();
            let value = penalty.value.unwrap_or_default();
            match state.rows.get_mut(&(race_id, penalty.driver_id)) {
                Some(row) => {
                    row.points_penalty += value;
                    row.recompute_effective_points();
                }
                None => {
                    warn!(
                        race_id,
                        driver_id = penalty.driver_id,
                        "No result row for points deduction in memory"
                    );
                    return Err(AppError::NotFound(
                        "No result row for this driver in this race".to_string(),
                    ));
                }
            }
        }

        state.penalties.insert(penalty.id, penalty.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, penalty_id: PenaltyId) -> Result<Penalty, AppError> {
        debug!(penalty_id = %penalty_id, "Removing penalty from memory");

        let mut state = self.state.lock().unwrap();
        let penalty = match state.penalties.get(&penalty_id) {
            Some(penalty) => penalty.clone(),
            None => {
                warn!(penalty_id = %penalty_id, "Penalty not found for removal in memory");
                return Err(AppError::NotFound("Penalty not found".to_string()));
            }
        };

        if penalty.deducts_points() {
            let race_id = penalty.race_id.unwrap_or_default();
            let value = penalty.value.unwrap_or_default();
            if let Some(row) = state.rows.get_mut(&(race_id, penalty.driver_id)) {
                row.points_penalty = (row.points_penalty - value).max(0);
                row.recompute_effective_points();
            }
        }

        state.penalties.remove(&penalty_id);
        debug!(penalty_id = %penalty_id, "Penalty removed from memory");
        Ok(penalty)
    }

    #[instrument(skip(self))]
    async fn get(&self, penalty_id: PenaltyId) -> Result<Option<Penalty>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.penalties.get(&penalty_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Penalty>, AppError> {
        let state = self.state.lock().unwrap();
        let mut penalties: Vec<Penalty> = state.penalties.values().cloned().collect();
        penalties.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(penalties)
    }

    #[instrument(skip(self))]
    async fn list_for_driver(&self, driver_id: DriverId) -> Result<Vec<Penalty>, AppError> {
        let state = self.state.lock().unwrap();
        let mut penalties: Vec<Penalty> = state
            .penalties
            .values()
            .filter(|penalty| penalty.driver_id == driver_id)
            .cloned()
            .collect();
        penalties.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(penalties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalties::models::PenaltyType;
    use crate::shared::test_utils::seed_basic_league;

    fn row(race_id: RaceId, driver_id: DriverId, position: i32, points: i32) -> ResultRow {
        ResultRow {
            race_id,
            driver_id,
            position: Some(position),
            raw_points: points,
            points_penalty: 0,
            effective_points: points,
            fastest_lap: false,
            pole_position: false,
            dnf: false,
            dnf_reason: None,
            time_penalty_secs: 0,
        }
    }

    #[tokio::test]
    async fn replace_marks_race_completed_and_swaps_rows() {
        let store = InMemoryStore::new();
        let league = seed_basic_league(&store).await;

        store
            .replace_race_results(league.race_1, &[row(league.race_1, league.driver_a, 1, 25)])
            .await
            .unwrap();
        store
            .replace_race_results(league.race_1, &[row(league.race_1, league.driver_b, 1, 25)])
            .await
            .unwrap();

        let rows = store.rows_for_race(league.race_1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].driver_id, league.driver_b);

        let race = store.get_race(league.race_1).await.unwrap().unwrap();
        assert_eq!(race.status, RaceStatus::Completed);
    }

    #[tokio::test]
    async fn replace_unknown_race_is_not_found() {
        let store = InMemoryStore::new();
        seed_basic_league(&store).await;

        let result = store.replace_race_results(999, &[]).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_race_with_rows_is_conflict() {
        let store = InMemoryStore::new();
        let league = seed_basic_league(&store).await;

        store
            .replace_race_results(league.race_1, &[row(league.race_1, league.driver_a, 1, 25)])
            .await
            .unwrap();

        let result = store.delete_race(league.race_1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(store.get_race(league.race_1).await.unwrap().is_some());

        store.delete_race(league.race_2).await.unwrap();
        assert!(store.get_race(league.race_2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_deduction_leaves_no_ledger_record() {
        let store = InMemoryStore::new();
        let league = seed_basic_league(&store).await;

        let penalty = Penalty::new(
            league.driver_a,
            Some(league.race_1),
            PenaltyType::PointsDeduction,
            Some(5),
            "contact".to_string(),
            "steward".to_string(),
        );
        let result = store.apply(&penalty).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.get(penalty.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn penalty_listing_is_newest_first() {
        let store = InMemoryStore::new();
        let league = seed_basic_league(&store).await;

        let mut older = Penalty::new(
            league.driver_a,
            None,
            PenaltyType::Warning,
            None,
            "track limits".to_string(),
            "steward".to_string(),
        );
        older.created_at -= chrono::Duration::minutes(5);
        let newer = Penalty::new(
            league.driver_b,
            None,
            PenaltyType::Warning,
            None,
            "track limits".to_string(),
            "steward".to_string(),
        );

        store.apply(&older).await.unwrap();
        store.apply(&newer).await.unwrap();

        let penalties = store.list().await.unwrap();
        assert_eq!(penalties[0].id, newer.id);
        assert_eq!(penalties[1].id, older.id);
    }
}
