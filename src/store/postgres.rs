use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument, warn};

use crate::league::models::{Driver, DriverId, Race, RaceId, RaceStatus, Season, SeasonId, Team, TeamId};
use crate::league::repository::LeagueRepository;
use crate::penalties::models::{Penalty, PenaltyId, PenaltyType};
use crate::penalties::repository::PenaltyRepository;
use crate::results::models::ResultRow;
use crate::results::repository::ResultsRepository;
use crate::shared::AppError;

/// PostgreSQL implementation of the league, results and penalty repositories
///
/// The cross-aggregate writes (result replacement, penalty apply/remove) run
/// inside a single database transaction each, mirroring the lock scope of
/// the in-memory store.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence(e: sqlx::Error) -> AppError {
    AppError::Persistence(e.to_string())
}

fn race_from_row(row: &sqlx::postgres::PgRow) -> Result<Race, AppError> {
    let status: String = row.get("status");
    Ok(Race {
        id: row.get("id"),
        season_id: row.get("season_id"),
        name: row.get("name"),
        track: row.get("track"),
        scheduled_at: row.get("scheduled_at"),
        status: RaceStatus::from_str(&status)
            .map_err(|_| AppError::Persistence(format!("unknown race status: {}", status)))?,
    })
}

fn result_row_from_row(row: &sqlx::postgres::PgRow) -> ResultRow {
    ResultRow {
        race_id: row.get("race_id"),
        driver_id: row.get("driver_id"),
        position: row.get("position"),
        raw_points: row.get("raw_points"),
        points_penalty: row.get("points_penalty"),
        effective_points: row.get("effective_points"),
        fastest_lap: row.get("fastest_lap"),
        pole_position: row.get("pole_position"),
        dnf: row.get("dnf"),
        dnf_reason: row.get("dnf_reason"),
        time_penalty_secs: row.get("time_penalty_secs"),
    }
}

fn penalty_from_row(row: &sqlx::postgres::PgRow) -> Result<Penalty, AppError> {
    let penalty_type: String = row.get("penalty_type");
    Ok(Penalty {
        id: row.get("id"),
        driver_id: row.get("driver_id"),
        race_id: row.get("race_id"),
        penalty_type: PenaltyType::from_str(&penalty_type).map_err(|_| {
            AppError::Persistence(format!("unknown penalty type: {}", penalty_type))
        })?,
        value: row.get("value"),
        reason: row.get("reason"),
        issued_by: row.get("issued_by"),
        created_at: row.get("created_at"),
    })
}

async fn insert_result_row(
    tx: &mut Transaction<'_, Postgres>,
    row: &ResultRow,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO race_results (race_id, driver_id, position, raw_points, points_penalty, effective_points, fastest_lap, pole_position, dnf, dnf_reason, time_penalty_secs) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(row.race_id)
    .bind(row.driver_id)
    .bind(row.position)
    .bind(row.raw_points)
    .bind(row.points_penalty)
    .bind(row.effective_points)
    .bind(row.fastest_lap)
    .bind(row.pole_position)
    .bind(row.dnf)
    .bind(&row.dnf_reason)
    .bind(row.time_penalty_secs)
    .execute(&mut **tx)
    .await
    .map_err(persistence)?;
    Ok(())
}

#[async_trait]
impl LeagueRepository for PostgresStore {
    #[instrument(skip(self, season))]
    async fn create_season(&self, season: &Season) -> Result<(), AppError> {
        debug!(season_id = season.id, name = %season.name, "Creating season in database");

        sqlx::query("INSERT INTO seasons (id, name, year, active) VALUES ($1, $2, $3, $4)")
            .bind(season.id)
            .bind(&season.name)
            .bind(season.year)
            .bind(season.active)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create season in database");
                persistence(e)
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_season(&self, season_id: SeasonId) -> Result<Option<Season>, AppError> {
        let row = sqlx::query("SELECT id, name, year, active FROM seasons WHERE id = $1")
            .bind(season_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        Ok(row.map(|row| Season {
            id: row.get("id"),
            name: row.get("name"),
            year: row.get("year"),
            active: row.get("active"),
        }))
    }

    #[instrument(skip(self, race))]
    async fn create_race(&self, race: &Race) -> Result<(), AppError> {
        debug!(race_id = race.id, season_id = race.season_id, "Creating race in database");

        sqlx::query(
            "INSERT INTO races (id, season_id, name, track, scheduled_at, status) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(race.id)
        .bind(race.season_id)
        .bind(&race.name)
        .bind(&race.track)
        .bind(race.scheduled_at)
        .bind(race.status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create race in database");
            persistence(e)
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_race(&self, race_id: RaceId) -> Result<Option<Race>, AppError> {
        let row = sqlx::query(
            "SELECT id, season_id, name, track, scheduled_at, status FROM races WHERE id = $1",
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        row.as_ref().map(race_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_races_in_season(&self, season_id: SeasonId) -> Result<Vec<Race>, AppError> {
        let rows = sqlx::query(
            "SELECT id, season_id, name, track, scheduled_at, status FROM races WHERE season_id = $1 ORDER BY scheduled_at",
        )
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        rows.iter().map(race_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn delete_race(&self, race_id: RaceId) -> Result<(), AppError> {
        debug!(race_id, "Deleting race from database");

        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let count_row = sqlx::query("SELECT COUNT(*) AS row_count FROM race_results WHERE race_id = $1")
            .bind(race_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(persistence)?;
        let row_count: i64 = count_row.get("row_count");
        if row_count > 0 {
            warn!(race_id, row_count, "Refusing to delete race with recorded results");
            return Err(AppError::Conflict(
                "Race has recorded results and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM races WHERE id = $1")
            .bind(race_id)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;
        if result.rows_affected() == 0 {
            warn!(race_id, "Race not found for deletion in database");
            return Err(AppError::NotFound("Race not found".to_string()));
        }

        tx.commit().await.map_err(persistence)?;
        debug!(race_id, "Race deleted from database");
        Ok(())
    }

    #[instrument(skip(self, team))]
    async fn create_team(&self, team: &Team) -> Result<(), AppError> {
        sqlx::query("INSERT INTO teams (id, name) VALUES ($1, $2)")
            .bind(team.id)
            .bind(&team.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create team in database");
                persistence(e)
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?;

        Ok(rows
            .iter()
            .map(|row| Team {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    #[instrument(skip(self, driver))]
    async fn create_driver(&self, driver: &Driver) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO drivers (id, user_id, name, number, team_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(driver.id)
        .bind(driver.user_id)
        .bind(&driver.name)
        .bind(driver.number)
        .bind(driver.team_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create driver in database");
            persistence(e)
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_driver(&self, driver_id: DriverId) -> Result<Option<Driver>, AppError> {
        let row = sqlx::query("SELECT id, user_id, name, number, team_id FROM drivers WHERE id = $1")
            .bind(driver_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        Ok(row.map(|row| Driver {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            number: row.get("number"),
            team_id: row.get("team_id"),
        }))
    }

    #[instrument(skip(self))]
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let rows = sqlx::query("SELECT id, user_id, name, number, team_id FROM drivers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?;

        Ok(rows
            .iter()
            .map(|row| Driver {
                id: row.get("id"),
                user_id: row.get("user_id"),
                name: row.get("name"),
                number: row.get("number"),
                team_id: row.get("team_id"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn set_driver_team(
        &self,
        driver_id: DriverId,
        team_id: Option<TeamId>,
    ) -> Result<(), AppError> {
        debug!(driver_id, ?team_id, "Moving driver to team in database");

        let result = sqlx::query("UPDATE drivers SET team_id = $2 WHERE id = $1")
            .bind(driver_id)
            .bind(team_id)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

        if result.rows_affected() == 0 {
            warn!(driver_id, "Driver not found for team move in database");
            return Err(AppError::NotFound("Driver not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResultsRepository for PostgresStore {
    #[instrument(skip(self, rows))]
    async fn replace_race_results(
        &self,
        race_id: RaceId,
        rows: &[ResultRow],
    ) -> Result<(), AppError> {
        debug!(race_id, entries = rows.len(), "Replacing race results in database");

        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let race = sqlx::query("SELECT id FROM races WHERE id = $1 FOR UPDATE")
            .bind(race_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(persistence)?;
        if race.is_none() {
            warn!(race_id, "Race not found for result replacement in database");
            return Err(AppError::NotFound("Race not found".to_string()));
        }

        sqlx::query("DELETE FROM race_results WHERE race_id = $1")
            .bind(race_id)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        for row in rows {
            insert_result_row(&mut tx, row).await?;
        }

        sqlx::query("UPDATE races SET status = $2 WHERE id = $1")
            .bind(race_id)
            .bind(RaceStatus::Completed.to_string())
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;
        debug!(race_id, entries = rows.len(), "Race results replaced in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rows_for_race(&self, race_id: RaceId) -> Result<Vec<ResultRow>, AppError> {
        let rows = sqlx::query(
            "SELECT race_id, driver_id, position, raw_points, points_penalty, effective_points, fastest_lap, pole_position, dnf, dnf_reason, time_penalty_secs \
             FROM race_results WHERE race_id = $1 \
             ORDER BY position IS NULL, position, driver_id",
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.iter().map(result_row_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn rows_for_season(&self, season_id: SeasonId) -> Result<Vec<ResultRow>, AppError> {
        let rows = sqlx::query(
            "SELECT r.race_id, r.driver_id, r.position, r.raw_points, r.points_penalty, r.effective_points, r.fastest_lap, r.pole_position, r.dnf, r.dnf_reason, r.time_penalty_secs \
             FROM race_results r JOIN races ON races.id = r.race_id \
             WHERE races.season_id = $1",
        )
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.iter().map(result_row_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn get_row(
        &self,
        race_id: RaceId,
        driver_id: DriverId,
    ) -> Result<Option<ResultRow>, AppError> {
        let row = sqlx::query(
            "SELECT race_id, driver_id, position, raw_points, points_penalty, effective_points, fastest_lap, pole_position, dnf, dnf_reason, time_penalty_secs \
             FROM race_results WHERE race_id = $1 AND driver_id = $2",
        )
        .bind(race_id)
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(row.as_ref().map(result_row_from_row))
    }
}

#[async_trait]
impl PenaltyRepository for PostgresStore {
    #[instrument(skip(self, penalty))]
    async fn apply(&self, penalty: &Penalty) -> Result<(), AppError> {
        debug!(
            penalty_id = %penalty.id,
            driver_id = penalty.driver_id,
            penalty_type = %penalty.penalty_type,
            "Applying penalty in database"
        );

        let mut tx = self.pool.begin().await.map_err(persistence)?;

        if penalty.deducts_points() {
            let result = sqlx::query(
                "UPDATE race_results \
                 SET points_penalty = points_penalty + $3, \
                     effective_points = GREATEST(0, raw_points - (points_penalty + $3)) \
                 WHERE race_id = $1 AND driver_id = $2",
            )
            .bind(penalty.race_id)
            .bind(penalty.driver_id)
            .bind(penalty.value)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

            if result.rows_affected() == 0 {
                warn!(
                    race_id = penalty.race_id,
                    driver_id = penalty.driver_id,
                    "No result row for points deduction in database"
                );
                return Err(AppError::NotFound(
                    "No result row for this driver in this race".to_string(),
                ));
            }
        }

        sqlx::query(
            "INSERT INTO penalties (id, driver_id, race_id, penalty_type, value, reason, issued_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(penalty.id)
        .bind(penalty.driver_id)
        .bind(penalty.race_id)
        .bind(penalty.penalty_type.to_string())
        .bind(penalty.value)
        .bind(&penalty.reason)
        .bind(&penalty.issued_by)
        .bind(penalty.created_at)
        .execute(&mut *tx)
        .await
        .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, penalty_id: PenaltyId) -> Result<Penalty, AppError> {
        debug!(penalty_id = %penalty_id, "Removing penalty from database");

        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let row = sqlx::query(
            "SELECT id, driver_id, race_id, penalty_type, value, reason, issued_by, created_at \
             FROM penalties WHERE id = $1 FOR UPDATE",
        )
        .bind(penalty_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence)?;

        let penalty = match row {
            Some(row) => penalty_from_row(&row)?,
            None => {
                warn!(penalty_id = %penalty_id, "Penalty not found for removal in database");
                return Err(AppError::NotFound("Penalty not found".to_string()));
            }
        };

        if penalty.deducts_points() {
            // Reverse the exact stored value, flooring the tally at zero.
            sqlx::query(
                "UPDATE race_results \
                 SET points_penalty = GREATEST(0, points_penalty - $3), \
                     effective_points = GREATEST(0, raw_points - GREATEST(0, points_penalty - $3)) \
                 WHERE race_id = $1 AND driver_id = $2",
            )
            .bind(penalty.race_id)
            .bind(penalty.driver_id)
            .bind(penalty.value)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;
        }

        sqlx::query("DELETE FROM penalties WHERE id = $1")
            .bind(penalty_id)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;
        debug!(penalty_id = %penalty_id, "Penalty removed from database");
        Ok(penalty)
    }

    #[instrument(skip(self))]
    async fn get(&self, penalty_id: PenaltyId) -> Result<Option<Penalty>, AppError> {
        let row = sqlx::query(
            "SELECT id, driver_id, race_id, penalty_type, value, reason, issued_by, created_at \
             FROM penalties WHERE id = $1",
        )
        .bind(penalty_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        row.as_ref().map(penalty_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Penalty>, AppError> {
        let rows = sqlx::query(
            "SELECT id, driver_id, race_id, penalty_type, value, reason, issued_by, created_at \
             FROM penalties ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        rows.iter().map(penalty_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn list_for_driver(&self, driver_id: DriverId) -> Result<Vec<Penalty>, AppError> {
        let rows = sqlx::query(
            "SELECT id, driver_id, race_id, penalty_type, value, reason, issued_by, created_at \
             FROM penalties WHERE driver_id = $1 ORDER BY created_at DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        rows.iter().map(penalty_from_row).collect()
    }
}
