use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::ResultsService,
    types::{RaceResultsResponse, ReplaceResultsRequest},
};
use crate::league::RaceId;
use crate::shared::{AppError, AppState};

fn results_service(state: &AppState) -> ResultsService {
    ResultsService::new(
        Arc::clone(&state.league_repository),
        Arc::clone(&state.results_repository),
        state.event_bus.clone(),
    )
}

/// HTTP handler for replacing the full result set of a race
///
/// POST /races/:race_id/results
/// Returns the stored rows and the updated race status
#[instrument(name = "replace_race_results", skip(state, request))]
pub async fn replace_race_results(
    State(state): State<AppState>,
    Path(race_id): Path<RaceId>,
    Json(request): Json<ReplaceResultsRequest>,
) -> Result<Json<RaceResultsResponse>, AppError> {
    info!(race_id, entries = request.results.len(), "Replacing race results");

    let response = results_service(&state)
        .replace_race_results(race_id, request)
        .await?;

    Ok(Json(response))
}

/// HTTP handler for reading the result set of a race
///
/// GET /races/:race_id/results
#[instrument(name = "get_race_results", skip(state))]
pub async fn get_race_results(
    State(state): State<AppState>,
    Path(race_id): Path<RaceId>,
) -> Result<Json<RaceResultsResponse>, AppError> {
    let response = results_service(&state).race_results(race_id).await?;
    Ok(Json(response))
}

/// HTTP handler for deleting a race without recorded results
///
/// DELETE /races/:race_id
/// Fails with 409 when the race already has result rows
#[instrument(name = "delete_race", skip(state))]
pub async fn delete_race(
    State(state): State<AppState>,
    Path(race_id): Path<RaceId>,
) -> Result<Json<serde_json::Value>, AppError> {
    results_service(&state).delete_race(race_id).await?;

    Ok(Json(serde_json::json!({ "deleted": race_id })))
}
