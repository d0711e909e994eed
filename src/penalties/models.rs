use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::league::{DriverId, RaceId};

pub type PenaltyId = Uuid;

/// Sanction categories. Only a points deduction ever touches a result row;
/// the rest are recorded for the stewards' ledger (time penalties are
/// mirrored informationally on the row at result entry time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum PenaltyType {
    #[strum(serialize = "Time Penalty")]
    TimePenalty,
    #[strum(serialize = "Points Deduction")]
    PointsDeduction,
    #[strum(serialize = "Grid Drop")]
    GridDrop,
    Warning,
    Disqualification,
}

impl PenaltyType {
    /// Whether this type carries a numeric value (seconds, points or grid
    /// slots). Warning and Disqualification ignore any supplied value.
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            PenaltyType::TimePenalty | PenaltyType::PointsDeduction | PenaltyType::GridDrop
        )
    }
}

/// A recorded penalty. The original `value` stays on the record so removal
/// reverses the exact row mutation instead of recomputing from current
/// state, which would drift under concurrent unrelated penalties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalty {
    pub id: PenaltyId,
    pub driver_id: DriverId,
    /// None means a general penalty not tied to any result row.
    pub race_id: Option<RaceId>,
    pub penalty_type: PenaltyType,
    pub value: Option<i32>,
    pub reason: String,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
}

impl Penalty {
    pub fn new(
        driver_id: DriverId,
        race_id: Option<RaceId>,
        penalty_type: PenaltyType,
        value: Option<i32>,
        reason: String,
        issued_by: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            driver_id,
            race_id,
            penalty_type,
            value,
            reason,
            issued_by,
            created_at: Utc::now(),
        }
    }

    /// True when applying/removing this penalty mutates a result row.
    pub fn deducts_points(&self) -> bool {
        self.penalty_type == PenaltyType::PointsDeduction
            && self.race_id.is_some()
            && self.value.unwrap_or(0) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn penalty_type_matches_ledger_labels() {
        assert_eq!(PenaltyType::PointsDeduction.to_string(), "Points Deduction");
        assert_eq!(PenaltyType::TimePenalty.to_string(), "Time Penalty");
        assert_eq!(PenaltyType::GridDrop.to_string(), "Grid Drop");
        assert_eq!(
            PenaltyType::from_str("Points Deduction").unwrap(),
            PenaltyType::PointsDeduction
        );
    }

    #[test]
    fn only_valued_race_deductions_touch_rows() {
        let deduction = Penalty::new(
            1,
            Some(10),
            PenaltyType::PointsDeduction,
            Some(5),
            "contact".to_string(),
            "steward".to_string(),
        );
        assert!(deduction.deducts_points());

        let general = Penalty::new(
            1,
            None,
            PenaltyType::PointsDeduction,
            Some(5),
            "conduct".to_string(),
            "steward".to_string(),
        );
        assert!(!general.deducts_points());

        let warning = Penalty::new(
            1,
            Some(10),
            PenaltyType::Warning,
            None,
            "track limits".to_string(),
            "steward".to_string(),
        );
        assert!(!warning.deducts_points());
    }
}
