use async_trait::async_trait;

use super::models::ResultRow;
use crate::league::{DriverId, RaceId, SeasonId};
use crate::shared::AppError;

/// Trait for result-row storage.
///
/// The replace operation is the only way result rows come into existence:
/// results are always submitted as a full set per race, never patched row by
/// row. Penalty-driven mutations of individual rows go through
/// `PenaltyRepository`, which shares the same backing store.
#[async_trait]
pub trait ResultsRepository {
    /// Atomically deletes every existing row for the race, inserts the new
    /// set and marks the race `Completed`, as one all-or-nothing unit.
    /// The aggregator can never observe a partially replaced race.
    ///
    /// Fails with `NotFound` when the race does not exist and `Persistence`
    /// on storage failure; in both cases the prior rows and the prior race
    /// status are left exactly as they were.
    async fn replace_race_results(
        &self,
        race_id: RaceId,
        rows: &[ResultRow],
    ) -> Result<(), AppError>;

    /// Rows for one race, classified finishers first in position order,
    /// unclassified entries last.
    async fn rows_for_race(&self, race_id: RaceId) -> Result<Vec<ResultRow>, AppError>;

    /// Every row belonging to any race of the season, in no particular order.
    async fn rows_for_season(&self, season_id: SeasonId) -> Result<Vec<ResultRow>, AppError>;

    async fn get_row(
        &self,
        race_id: RaceId,
        driver_id: DriverId,
    ) -> Result<Option<ResultRow>, AppError>;
}
