use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::PenaltyId,
    service::PenaltyService,
    types::{ApplyPenaltyRequest, PenaltyResponse},
};
use crate::shared::{AppError, AppState};

fn penalty_service(state: &AppState) -> PenaltyService {
    PenaltyService::new(
        Arc::clone(&state.league_repository),
        Arc::clone(&state.penalty_repository),
        state.event_bus.clone(),
    )
}

/// HTTP handler for issuing a penalty
///
/// POST /penalties
/// Returns the created penalty record
#[instrument(name = "apply_penalty", skip(state, request))]
pub async fn apply_penalty(
    State(state): State<AppState>,
    Json(request): Json<ApplyPenaltyRequest>,
) -> Result<Json<PenaltyResponse>, AppError> {
    info!(
        driver_id = request.driver_id,
        penalty_type = %request.penalty_type,
        "Applying penalty"
    );

    let penalty = penalty_service(&state).apply_penalty(request).await?;
    Ok(Json(penalty))
}

/// HTTP handler for listing the penalty ledger
///
/// GET /penalties
#[instrument(name = "list_penalties", skip(state))]
pub async fn list_penalties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PenaltyResponse>>, AppError> {
    let penalties = penalty_service(&state).list_penalties().await?;
    Ok(Json(penalties))
}

/// HTTP handler for removing a penalty and restoring the affected row
///
/// DELETE /penalties/:penalty_id
#[instrument(name = "remove_penalty", skip(state))]
pub async fn remove_penalty(
    State(state): State<AppState>,
    Path(penalty_id): Path<PenaltyId>,
) -> Result<Json<serde_json::Value>, AppError> {
    penalty_service(&state).remove_penalty(penalty_id).await?;
    Ok(Json(serde_json::json!({ "removed": penalty_id })))
}
