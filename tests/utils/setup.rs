use std::sync::Arc;

use chrono::{TimeZone, Utc};

use paddock::{
    event::EventBus,
    league::{Driver, DriverId, LeagueRepository, Race, RaceId, RaceStatus, Season, SeasonId, Team, TeamId},
    penalties::PenaltyService,
    results::ResultsService,
    standings::StandingsService,
    store::InMemoryStore,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Ids of the seeded fixture league.
pub struct TestLeague {
    pub season: SeasonId,
    pub races: Vec<RaceId>,
    pub team_red: TeamId,
    pub team_blue: TeamId,
    pub driver_a: DriverId,
    pub driver_b: DriverId,
    pub driver_c: DriverId,
}

pub struct TestSetup {
    pub store: Arc<InMemoryStore>,
    pub event_bus: EventBus,
    pub results: ResultsService,
    pub penalties: PenaltyService,
    pub standings: StandingsService,
    pub league: TestLeague,
}

pub struct TestSetupBuilder {
    race_count: usize,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { race_count: 3 }
    }

    pub fn with_race_count(mut self, race_count: usize) -> Self {
        self.race_count = race_count;
        self
    }

    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryStore::new());
        let event_bus = EventBus::new(100);

        let season: SeasonId = 1;
        store
            .create_season(&Season {
                id: season,
                name: "Test Championship".to_string(),
                year: 2026,
                active: true,
            })
            .await
            .unwrap();

        let mut races = Vec::new();
        for round in 0..self.race_count {
            let race_id = 101 + round as RaceId;
            store
                .create_race(&Race {
                    id: race_id,
                    season_id: season,
                    name: format!("Round {}", round + 1),
                    track: "Test Circuit".to_string(),
                    scheduled_at: Utc
                        .with_ymd_and_hms(2026, 3, 1, 14, 0, 0)
                        .unwrap()
                        + chrono::Duration::days(7 * round as i64),
                    status: RaceStatus::Scheduled,
                })
                .await
                .unwrap();
            races.push(race_id);
        }

        let league = TestLeague {
            season,
            races,
            team_red: 11,
            team_blue: 12,
            driver_a: 21,
            driver_b: 22,
            driver_c: 23,
        };

        store
            .create_team(&Team {
                id: league.team_red,
                name: "Crimson Racing".to_string(),
            })
            .await
            .unwrap();
        store
            .create_team(&Team {
                id: league.team_blue,
                name: "Azure Motorsport".to_string(),
            })
            .await
            .unwrap();

        for (driver_id, user_id, name, number, team_id) in [
            (league.driver_a, 1001, "alice", Some(44), Some(league.team_red)),
            (league.driver_b, 1002, "bruno", Some(16), Some(league.team_blue)),
            (league.driver_c, 1003, "cato", None, None),
        ] {
            store
                .create_driver(&Driver {
                    id: driver_id,
                    user_id,
                    name: name.to_string(),
                    number,
                    team_id,
                })
                .await
                .unwrap();
        }

        let results = ResultsService::new(store.clone(), store.clone(), event_bus.clone());
        let penalties = PenaltyService::new(store.clone(), store.clone(), event_bus.clone());
        let standings = StandingsService::new(store.clone(), store.clone());

        TestSetup {
            store,
            event_bus,
            results,
            penalties,
            standings,
            league,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
