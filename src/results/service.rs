use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::{
    models::ResultRow,
    repository::ResultsRepository,
    types::{RaceResultsResponse, ReplaceResultsRequest, ResultEntryRequest},
};
use crate::event::{EventBus, LeagueEvent};
use crate::league::{LeagueRepository, RaceId};
use crate::shared::AppError;

/// Reconciliation coordinator for race results.
///
/// Owns the full-set replacement flow (validation, the atomic write, the
/// `Completed` status side effect) and the guarded race deletion. Standings
/// consumers only ever see a race's result set fully-old or fully-new.
pub struct ResultsService {
    league_repository: Arc<dyn LeagueRepository + Send + Sync>,
    results_repository: Arc<dyn ResultsRepository + Send + Sync>,
    event_bus: EventBus,
}

impl ResultsService {
    pub fn new(
        league_repository: Arc<dyn LeagueRepository + Send + Sync>,
        results_repository: Arc<dyn ResultsRepository + Send + Sync>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            league_repository,
            results_repository,
            event_bus,
        }
    }

    /// Replaces the full result set for a race.
    ///
    /// The write is all-or-nothing: on any error the race keeps its prior
    /// rows and prior status. On success the race is `Completed` and a
    /// `ResultsRecorded` event is emitted (fire-and-forget).
    #[instrument(skip(self, request))]
    pub async fn replace_race_results(
        &self,
        race_id: RaceId,
        request: ReplaceResultsRequest,
    ) -> Result<RaceResultsResponse, AppError> {
        if request.results.is_empty() {
            return Err(AppError::Validation(
                "at least one result entry is required".to_string(),
            ));
        }

        let race = self
            .league_repository
            .get_race(race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("race {} does not exist", race_id)))?;

        let rows = self.validate_entries(race_id, &request.results).await?;

        self.results_repository
            .replace_race_results(race_id, &rows)
            .await?;

        info!(
            race_id,
            entries = rows.len(),
            "Race results replaced, race marked completed"
        );

        self.event_bus.emit(LeagueEvent::ResultsRecorded {
            race_id,
            season_id: race.season_id,
            entries: rows.len(),
        });

        self.race_results(race_id).await
    }

    /// Reads back the current result set for a race.
    #[instrument(skip(self))]
    pub async fn race_results(&self, race_id: RaceId) -> Result<RaceResultsResponse, AppError> {
        let race = self
            .league_repository
            .get_race(race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("race {} does not exist", race_id)))?;

        let rows = self.results_repository.rows_for_race(race_id).await?;

        Ok(RaceResultsResponse {
            race_id,
            race_status: race.status.to_string(),
            rows,
        })
    }

    /// Deletes a race that has no recorded results. A race with result rows
    /// is protected and the call fails with `Conflict`.
    #[instrument(skip(self))]
    pub async fn delete_race(&self, race_id: RaceId) -> Result<(), AppError> {
        self.league_repository.delete_race(race_id).await?;

        info!(race_id, "Race deleted");
        self.event_bus.emit(LeagueEvent::RaceDeleted { race_id });

        Ok(())
    }

    async fn validate_entries(
        &self,
        race_id: RaceId,
        entries: &[ResultEntryRequest],
    ) -> Result<Vec<ResultRow>, AppError> {
        let mut seen_drivers = HashSet::new();
        let mut rows = Vec::with_capacity(entries.len());

        for entry in entries {
            if !seen_drivers.insert(entry.driver_id) {
                return Err(AppError::Validation(format!(
                    "driver {} appears more than once in the result set",
                    entry.driver_id
                )));
            }

            self.league_repository
                .get_driver(entry.driver_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("driver {} does not exist", entry.driver_id))
                })?;

            if entry.points < 0 {
                return Err(AppError::Validation(format!(
                    "driver {}: points must not be negative",
                    entry.driver_id
                )));
            }
            if entry.points_penalty < 0 {
                return Err(AppError::Validation(format!(
                    "driver {}: points_penalty must not be negative",
                    entry.driver_id
                )));
            }
            if entry.time_penalty_secs < 0 {
                return Err(AppError::Validation(format!(
                    "driver {}: time_penalty_secs must not be negative",
                    entry.driver_id
                )));
            }
            if let Some(position) = entry.position {
                if position < 1 {
                    return Err(AppError::Validation(format!(
                        "driver {}: position must be 1 or greater",
                        entry.driver_id
                    )));
                }
            }

            // Recommended precondition, not a hard invariant: a DNF entry
            // should be unclassified.
            if entry.dnf && entry.position.is_some() {
                warn!(
                    race_id,
                    driver_id = entry.driver_id,
                    "DNF entry submitted with a classified position"
                );
            }

            debug!(race_id, driver_id = entry.driver_id, "Result entry validated");

            rows.push(ResultRow {
                race_id,
                driver_id: entry.driver_id,
                position: entry.position,
                raw_points: entry.points,
                points_penalty: entry.points_penalty,
                effective_points: ResultRow::clamped_points(entry.points, entry.points_penalty),
                fastest_lap: entry.fastest_lap,
                pole_position: entry.pole_position,
                dnf: entry.dnf,
                dnf_reason: entry.dnf_reason.clone(),
                time_penalty_secs: entry.time_penalty_secs,
            });
        }

        Ok(rows)
    }
}
