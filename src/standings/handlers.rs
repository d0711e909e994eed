use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{models::StandingsResponse, service::StandingsService};
use crate::league::SeasonId;
use crate::shared::{AppError, AppState};

/// HTTP handler for the championship standings of a season
///
/// GET /seasons/:season_id/standings
/// Returns driver and team standings in deterministic tie-break order
#[instrument(name = "get_standings", skip(state))]
pub async fn get_standings(
    State(state): State<AppState>,
    Path(season_id): Path<SeasonId>,
) -> Result<Json<StandingsResponse>, AppError> {
    let service = StandingsService::new(
        Arc::clone(&state.league_repository),
        Arc::clone(&state.results_repository),
    );
    let standings = service.compute_standings(season_id).await?;

    Ok(Json(standings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ReplaceResultsRequest, ResultEntryRequest, ResultsService};
    use crate::shared::test_utils::{seed_basic_league, AppStateBuilder};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_get_standings_handler() {
        let (app_state, store) = AppStateBuilder::new().build_with_store();
        let league = seed_basic_league(store.as_ref()).await;

        let results = ResultsService::new(store.clone(), store.clone(), app_state.event_bus.clone());
        results
            .replace_race_results(
                league.race_1,
                ReplaceResultsRequest {
                    results: vec![
                        ResultEntryRequest {
                            position: Some(1),
                            points: 25,
                            ..ResultEntryRequest::for_driver(league.driver_a)
                        },
                        ResultEntryRequest {
                            position: Some(2),
                            points: 18,
                            ..ResultEntryRequest::for_driver(league.driver_b)
                        },
                    ],
                },
            )
            .await
            .unwrap();

        let app = Router::new()
            .route(
                "/seasons/:season_id/standings",
                axum::routing::get(get_standings),
            )
            .with_state(app_state);

        let request = Request::builder()
            .method("GET")
            .uri(format!("/seasons/{}/standings", league.season))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let standings: StandingsResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(standings.season_id, league.season);
        assert_eq!(standings.drivers[0].driver_id, league.driver_a);
        assert_eq!(standings.drivers[0].total_points, 25);
        assert!(!standings.teams.is_empty());
    }

    #[tokio::test]
    async fn test_get_standings_unknown_season_returns_404() {
        let (app_state, store) = AppStateBuilder::new().build_with_store();
        seed_basic_league(store.as_ref()).await;

        let app = Router::new()
            .route(
                "/seasons/:season_id/standings",
                axum::routing::get(get_standings),
            )
            .with_state(app_state);

        let request = Request::builder()
            .method("GET")
            .uri("/seasons/9999/standings")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
