use std::sync::Arc;

use tracing::{info, instrument};

use super::{
    models::{Penalty, PenaltyId},
    repository::PenaltyRepository,
    types::{ApplyPenaltyRequest, PenaltyResponse},
};
use crate::event::{EventBus, LeagueEvent};
use crate::league::LeagueRepository;
use crate::shared::AppError;

/// Service for the penalty ledger.
///
/// Validates requests, delegates the transactional apply/remove to the
/// repository and emits ledger events for notification collaborators.
pub struct PenaltyService {
    league_repository: Arc<dyn LeagueRepository + Send + Sync>,
    penalty_repository: Arc<dyn PenaltyRepository + Send + Sync>,
    event_bus: EventBus,
}

impl PenaltyService {
    pub fn new(
        league_repository: Arc<dyn LeagueRepository + Send + Sync>,
        penalty_repository: Arc<dyn PenaltyRepository + Send + Sync>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            league_repository,
            penalty_repository,
            event_bus,
        }
    }

    /// Issues a penalty. A points deduction tied to a race mutates the
    /// matching result row in the same transaction as the ledger insert:
    /// either both happen or neither does.
    #[instrument(skip(self, request))]
    pub async fn apply_penalty(
        &self,
        request: ApplyPenaltyRequest,
    ) -> Result<PenaltyResponse, AppError> {
        if request.reason.trim().is_empty() {
            return Err(AppError::Validation("reason is required".to_string()));
        }

        self.league_repository
            .get_driver(request.driver_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("driver {} does not exist", request.driver_id))
            })?;

        let value = if request.penalty_type.requires_value() {
            match request.value {
                Some(value) if value > 0 => Some(value),
                _ => {
                    return Err(AppError::Validation(format!(
                        "a positive value is required for a {} penalty",
                        request.penalty_type
                    )))
                }
            }
        } else {
            // Warning / Disqualification carry no numeric value.
            None
        };

        let penalty = Penalty::new(
            request.driver_id,
            request.race_id,
            request.penalty_type,
            value,
            request.reason,
            request.issued_by,
        );

        self.penalty_repository.apply(&penalty).await?;

        info!(
            penalty_id = %penalty.id,
            driver_id = penalty.driver_id,
            penalty_type = %penalty.penalty_type,
            "Penalty applied"
        );

        self.event_bus.emit(LeagueEvent::PenaltyApplied {
            penalty_id: penalty.id,
            driver_id: penalty.driver_id,
            race_id: penalty.race_id,
            penalty_type: penalty.penalty_type.to_string(),
        });

        Ok(penalty.into())
    }

    /// Removes a penalty, restoring the affected result row to its
    /// pre-penalty point totals exactly (the reverse of the original
    /// mutation, using the value stored on the record).
    #[instrument(skip(self))]
    pub async fn remove_penalty(&self, penalty_id: PenaltyId) -> Result<(), AppError> {
        let removed = self.penalty_repository.remove(penalty_id).await?;

        info!(
            penalty_id = %removed.id,
            driver_id = removed.driver_id,
            "Penalty removed"
        );

        self.event_bus.emit(LeagueEvent::PenaltyRemoved {
            penalty_id: removed.id,
            driver_id: removed.driver_id,
            race_id: removed.race_id,
        });

        Ok(())
    }

    /// Lists every penalty on the ledger, newest first.
    #[instrument(skip(self))]
    pub async fn list_penalties(&self) -> Result<Vec<PenaltyResponse>, AppError> {
        let penalties = self.penalty_repository.list().await?;
        Ok(penalties.into_iter().map(Into::into).collect())
    }
}
