use paddock::{
    league::{DriverId, RaceId},
    penalties::{ApplyPenaltyRequest, PenaltyResponse, PenaltyType},
    results::{RaceResultsResponse, ReplaceResultsRequest, ResultEntryRequest},
};

use super::setup::TestSetup;

/// A classified finish scoring `points`.
pub fn entry(driver_id: DriverId, position: i32, points: i32) -> ResultEntryRequest {
    ResultEntryRequest {
        position: Some(position),
        points,
        ..ResultEntryRequest::for_driver(driver_id)
    }
}

/// Submits a full result sheet for one race.
pub async fn record_results(
    setup: &TestSetup,
    race_id: RaceId,
    entries: Vec<ResultEntryRequest>,
) -> RaceResultsResponse {
    setup
        .results
        .replace_race_results(race_id, ReplaceResultsRequest { results: entries })
        .await
        .unwrap()
}

/// Issues a points deduction against one result row.
pub async fn deduction(
    setup: &TestSetup,
    driver_id: DriverId,
    race_id: RaceId,
    value: i32,
) -> PenaltyResponse {
    setup
        .penalties
        .apply_penalty(ApplyPenaltyRequest {
            driver_id,
            race_id: Some(race_id),
            penalty_type: PenaltyType::PointsDeduction,
            value: Some(value),
            reason: "stewards' decision".to_string(),
            issued_by: "race-director".to_string(),
        })
        .await
        .unwrap()
}
