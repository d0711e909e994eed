use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub type SeasonId = i64;
pub type RaceId = i64;
pub type DriverId = i64;
pub type TeamId = i64;

/// A championship season. Races belong to exactly one season and standings
/// are always computed per season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub name: String,
    pub year: i32,
    pub active: bool,
}

/// Lifecycle of a race. `Completed` is never set directly by callers: it is
/// a side effect of a successful result replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum RaceStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub season_id: SeasonId,
    pub name: String,
    pub track: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: RaceStatus,
}

impl Race {
    pub fn is_completed(&self) -> bool {
        self.status == RaceStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// A league driver. Identity is immutable for aggregation purposes; the team
/// affiliation may change between races and standings always join through the
/// driver's current team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub user_id: i64,
    pub name: String,
    pub number: Option<i32>,
    pub team_id: Option<TeamId>,
}

impl Driver {
    pub fn is_independent(&self) -> bool {
        self.team_id.is_none()
    }
}
