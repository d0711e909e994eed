use async_trait::async_trait;

use super::models::{Penalty, PenaltyId};
use crate::league::DriverId;
use crate::shared::AppError;

/// Trait for penalty ledger storage.
///
/// Apply and remove are transactional with the result-row mutation they
/// imply: a points deduction tied to a race either inserts the record AND
/// adjusts the row, or does neither. Implementations share their backing
/// store with `ResultsRepository` to make that boundary real.
#[async_trait]
pub trait PenaltyRepository {
    /// Inserts the penalty record. When the penalty deducts points for a
    /// specific race, the matching result row's `points_penalty` is
    /// incremented by the penalty value and `effective_points` re-clamped
    /// within the same transaction.
    ///
    /// Fails with `NotFound` (and creates nothing) when a points deduction
    /// references a (race, driver) pair with no result row.
    async fn apply(&self, penalty: &Penalty) -> Result<(), AppError>;

    /// Deletes the penalty record, first reversing its row mutation: the
    /// stored original value is subtracted from `points_penalty` (floored
    /// at 0) and `effective_points` re-clamped. One transaction; returns
    /// the removed record.
    ///
    /// Fails with `NotFound` when the id is unknown; no row is touched.
    async fn remove(&self, penalty_id: PenaltyId) -> Result<Penalty, AppError>;

    async fn get(&self, penalty_id: PenaltyId) -> Result<Option<Penalty>, AppError>;
    async fn list(&self) -> Result<Vec<Penalty>, AppError>;
    async fn list_for_driver(&self, driver_id: DriverId) -> Result<Vec<Penalty>, AppError>;
}
