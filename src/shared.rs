use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::event::EventBus;
use crate::league::repository::LeagueRepository;
use crate::penalties::repository::PenaltyRepository;
use crate::results::repository::ResultsRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub league_repository: Arc<dyn LeagueRepository + Send + Sync>,
    pub results_repository: Arc<dyn ResultsRepository + Send + Sync>,
    pub penalty_repository: Arc<dyn PenaltyRepository + Send + Sync>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        league_repository: Arc<dyn LeagueRepository + Send + Sync>,
        results_repository: Arc<dyn ResultsRepository + Send + Sync>,
        penalty_repository: Arc<dyn PenaltyRepository + Send + Sync>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            league_repository,
            results_repository,
            penalty_repository,
            event_bus,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Persistence(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Persistence error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::league::models::{Driver, DriverId, Race, RaceId, RaceStatus, Season, SeasonId, Team, TeamId};
    use crate::results::models::ResultRow;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Ids of the fixture league seeded by `seed_basic_league`.
    ///
    /// Three scheduled races in one season, two teams, three drivers:
    /// driver A on team red, driver B on team blue, driver C independent.
    pub struct TestLeague {
        pub season: SeasonId,
        pub race_1: RaceId,
        pub race_2: RaceId,
        pub race_3: RaceId,
        pub team_red: TeamId,
        pub team_blue: TeamId,
        pub driver_a: DriverId,
        pub driver_b: DriverId,
        pub driver_c: DriverId,
    }

    /// Seeds a small league into the store and returns its ids.
    pub async fn seed_basic_league(store: &InMemoryStore) -> TestLeague {
        let league = TestLeague {
            season: 1,
            race_1: 101,
            race_2: 102,
            race_3: 103,
            team_red: 11,
            team_blue: 12,
            driver_a: 21,
            driver_b: 22,
            driver_c: 23,
        };

        store
            .create_season(&Season {
                id: league.season,
                name: "Test Championship".to_string(),
                year: 2026,
                active: true,
            })
            .await
            .unwrap();

        for (race_id, name, track, round) in [
            (league.race_1, "Round 1", "Silverstone", 1),
            (league.race_2, "Round 2", "Monza", 2),
            (league.race_3, "Round 3", "Suzuka", 3),
        ] {
            store
                .create_race(&Race {
                    id: race_id,
                    season_id: league.season,
                    name: name.to_string(),
                    track: track.to_string(),
                    scheduled_at: Utc.with_ymd_and_hms(2026, 3, round * 7, 14, 0, 0).unwrap(),
                    status: RaceStatus::Scheduled,
                })
                .await
                .unwrap();
        }

        store
            .create_team(&Team {
                id: league.team_red,
                name: "Crimson Racing".to_string(),
            })
            .await
            .unwrap();
        store
            .create_team(&Team {
                id: league.team_blue,
                name: "Azure Motorsport".to_string(),
            })
            .await
            .unwrap();

        for (driver_id, user_id, name, number, team_id) in [
            (league.driver_a, 1001, "alice", Some(44), Some(league.team_red)),
            (league.driver_b, 1002, "bruno", Some(16), Some(league.team_blue)),
            (league.driver_c, 1003, "cato", None, None),
        ] {
            store
                .create_driver(&Driver {
                    id: driver_id,
                    user_id,
                    name: name.to_string(),
                    number,
                    team_id,
                })
                .await
                .unwrap();
        }

        league
    }

    /// Results repository wrapper that can be told to fail the replace call,
    /// for exercising all-or-nothing behavior without a real storage fault.
    pub struct FailingResultsRepository {
        inner: Arc<InMemoryStore>,
        fail_replace: AtomicBool,
    }

    impl FailingResultsRepository {
        pub fn new(inner: Arc<InMemoryStore>) -> Self {
            Self {
                inner,
                fail_replace: AtomicBool::new(false),
            }
        }

        pub fn fail_replace(&self) {
            self.fail_replace.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ResultsRepository for FailingResultsRepository {
        async fn replace_race_results(
            &self,
            race_id: RaceId,
            rows: &[ResultRow],
        ) -> Result<(), AppError> {
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(AppError::Persistence("injected replace failure".to_string()));
            }
            self.inner.replace_race_results(race_id, rows).await
        }

        async fn rows_for_race(&self, race_id: RaceId) -> Result<Vec<ResultRow>, AppError> {
            self.inner.rows_for_race(race_id).await
        }

        async fn rows_for_season(&self, season_id: SeasonId) -> Result<Vec<ResultRow>, AppError> {
            self.inner.rows_for_season(season_id).await
        }

        async fn get_row(
            &self,
            race_id: RaceId,
            driver_id: DriverId,
        ) -> Result<Option<ResultRow>, AppError> {
            self.inner.get_row(race_id, driver_id).await
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        store: Option<Arc<InMemoryStore>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self { store: None }
        }

        pub fn with_store(mut self, store: Arc<InMemoryStore>) -> Self {
            self.store = Some(store);
            self
        }

        pub fn build(self) -> AppState {
            self.build_with_store().0
        }

        /// Builds the state and hands back the backing store so tests can
        /// seed fixtures and inspect rows directly.
        pub fn build_with_store(self) -> (AppState, Arc<InMemoryStore>) {
            let store = self.store.unwrap_or_else(|| Arc::new(InMemoryStore::new()));
            let state = AppState::new(
                store.clone(),
                store.clone(),
                store.clone(),
                EventBus::new(1000),
            );
            (state, store)
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
