use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::models::{DriverStanding, StandingsResponse, TeamStanding};
use crate::league::{DriverId, LeagueRepository, SeasonId, TeamId};
use crate::results::{ResultRow, ResultsRepository};
use crate::shared::AppError;

/// Standings aggregator: an explicit, pure fold over result-row history.
///
/// No caching and no side effects; calling it twice with no intervening
/// mutation yields identical ordered output, including tie-break order.
pub struct StandingsService {
    league_repository: Arc<dyn LeagueRepository + Send + Sync>,
    results_repository: Arc<dyn ResultsRepository + Send + Sync>,
}

#[derive(Debug, Default, Clone)]
struct Totals {
    points: i32,
    wins: u32,
    poles: u32,
    fastest_laps: u32,
    dnfs: u32,
    position_sum: i64,
    classified: u32,
}

impl Totals {
    fn avg_position(&self) -> Option<f64> {
        if self.classified == 0 {
            None
        } else {
            Some(self.position_sum as f64 / self.classified as f64)
        }
    }
}

impl StandingsService {
    pub fn new(
        league_repository: Arc<dyn LeagueRepository + Send + Sync>,
        results_repository: Arc<dyn ResultsRepository + Send + Sync>,
    ) -> Self {
        Self {
            league_repository,
            results_repository,
        }
    }

    /// Computes driver and team standings for a season.
    #[instrument(skip(self))]
    pub async fn compute_standings(
        &self,
        season_id: SeasonId,
    ) -> Result<StandingsResponse, AppError> {
        self.league_repository
            .get_season(season_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("season {} does not exist", season_id)))?;

        let rows = self.results_repository.rows_for_season(season_id).await?;
        let drivers = self.league_repository.list_drivers().await?;
        let teams = self.league_repository.list_teams().await?;

        debug!(
            season_id,
            rows = rows.len(),
            drivers = drivers.len(),
            "Aggregating standings"
        );

        let mut totals: HashMap<DriverId, Totals> = HashMap::new();
        for row in &rows {
            let entry = totals.entry(row.driver_id).or_default();
            entry.points += row.effective_points;
            if row.is_win() {
                entry.wins += 1;
            }
            if row.pole_position {
                entry.poles += 1;
            }
            if row.fastest_lap {
                entry.fastest_laps += 1;
            }
            if row.dnf {
                entry.dnfs += 1;
            }
            // Unclassified rows are excluded from the average entirely, not
            // counted as position zero.
            if let Some(position) = row.position {
                entry.position_sum += position as i64;
                entry.classified += 1;
            }
        }

        let team_names: HashMap<TeamId, String> =
            teams.iter().map(|t| (t.id, t.name.clone())).collect();

        // Every driver appears, including those without any rows this season.
        let mut driver_standings: Vec<DriverStanding> = drivers
            .iter()
            .map(|driver| {
                let t = totals.get(&driver.id).cloned().unwrap_or_default();
                DriverStanding {
                    driver_id: driver.id,
                    driver_name: driver.name.clone(),
                    driver_number: driver.number,
                    team_name: driver.team_id.and_then(|id| team_names.get(&id).cloned()),
                    total_points: t.points,
                    wins: t.wins,
                    poles: t.poles,
                    fastest_laps: t.fastest_laps,
                    dnfs: t.dnfs,
                    avg_position: t.avg_position(),
                }
            })
            .collect();
        driver_standings.sort_by(driver_ranking);

        // Team standings group through each driver's CURRENT team, so a
        // mid-season team change retroactively moves prior results. Known
        // ambiguity carried over from the original system; see DESIGN.md.
        let mut per_team: HashMap<TeamId, (Totals, u32)> = HashMap::new();
        for driver in &drivers {
            let Some(team_id) = driver.team_id else {
                continue;
            };
            let slot = per_team.entry(team_id).or_default();
            slot.1 += 1;
            if let Some(t) = totals.get(&driver.id) {
                slot.0.points += t.points;
                slot.0.wins += t.wins;
                slot.0.poles += t.poles;
                slot.0.fastest_laps += t.fastest_laps;
            }
        }

        let mut team_standings: Vec<TeamStanding> = teams
            .iter()
            .filter_map(|team| {
                let (t, driver_count) = per_team.get(&team.id)?;
                Some(TeamStanding {
                    team_id: team.id,
                    team_name: team.name.clone(),
                    total_points: t.points,
                    wins: t.wins,
                    poles: t.poles,
                    fastest_laps: t.fastest_laps,
                    driver_count: *driver_count,
                })
            })
            .collect();
        team_standings.sort_by(team_ranking);

        Ok(StandingsResponse {
            season_id,
            drivers: driver_standings,
            teams: team_standings,
        })
    }
}

/// Tie-break order for drivers: points desc, wins desc, average finishing
/// position asc (no classified finishes sorts last within the tie group),
/// then driver id asc as the deterministic final key.
fn driver_ranking(a: &DriverStanding, b: &DriverStanding) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| compare_avg_position(a.avg_position, b.avg_position))
        .then_with(|| a.driver_id.cmp(&b.driver_id))
}

/// Tie-break order for teams: points desc, wins desc, team id asc.
fn team_ranking(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

fn compare_avg_position(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
