use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Penalty, PenaltyId, PenaltyType};
use crate::league::{DriverId, RaceId};

/// Request payload for issuing a penalty.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyPenaltyRequest {
    pub driver_id: DriverId,
    /// Omit for a general penalty not tied to any race result.
    pub race_id: Option<RaceId>,
    pub penalty_type: PenaltyType,
    /// Required and positive for Time Penalty / Points Deduction / Grid
    /// Drop; ignored for Warning and Disqualification.
    pub value: Option<i32>,
    pub reason: String,
    pub issued_by: String,
}

/// Response for penalty creation and listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct PenaltyResponse {
    pub id: PenaltyId,
    pub driver_id: DriverId,
    pub race_id: Option<RaceId>,
    pub penalty_type: String,
    pub value: Option<i32>,
    pub reason: String,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<Penalty> for PenaltyResponse {
    fn from(penalty: Penalty) -> Self {
        Self {
            id: penalty.id,
            driver_id: penalty.driver_id,
            race_id: penalty.race_id,
            penalty_type: penalty.penalty_type.to_string(),
            value: penalty.value,
            reason: penalty.reason,
            issued_by: penalty.issued_by,
            created_at: penalty.created_at,
        }
    }
}
