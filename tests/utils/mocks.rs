use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use paddock::{
    league::{DriverId, RaceId, SeasonId},
    results::{ResultRow, ResultsRepository},
    shared::AppError,
    store::InMemoryStore,
};

/// Results repository wrapper that can be told to fail the replace call,
/// for exercising all-or-nothing behavior without a real storage fault.
pub struct FlakyResultsRepository {
    inner: Arc<InMemoryStore>,
    fail_replace: AtomicBool,
}

impl FlakyResultsRepository {
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
impl ResultsRepository for FlakyResultsRepository {
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
