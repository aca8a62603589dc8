use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureStatus {
    NotStarted,
    Scheduled,
    Timed,
    InPlay,
    Finished,
}

impl FixtureStatus {
    /// Parses the status strings stored in the fixtures table and the ones
    /// the football API sends. Anything unrecognised (POSTPONED, CANCELLED
    /// and friends) is treated as not started, which keeps it out of scoring.
    pub fn parse(value: &str) -> FixtureStatus {
        match value {
            "SCHEDULED" => FixtureStatus::Scheduled,
            "TIMED" => FixtureStatus::Timed,
            "IN_PLAY" | "PAUSED" => FixtureStatus::InPlay,
            "FINISHED" => FixtureStatus::Finished,
            _ => FixtureStatus::NotStarted,
        }
    }

    /// Kick-off has happened; score guesses for the fixture are locked.
    pub fn has_started(&self) -> bool {
        matches!(self, FixtureStatus::InPlay | FixtureStatus::Finished)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureStatus::NotStarted => "NOT_STARTED",
            FixtureStatus::Scheduled => "SCHEDULED",
            FixtureStatus::Timed => "TIMED",
            FixtureStatus::InPlay => "IN_PLAY",
            FixtureStatus::Finished => "FINISHED",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::models::schema::fixtures)]
pub struct Fixture {
    pub id: i32,
    pub season: String,
    #[serde(rename = "homeTeam")]
    pub home_team_id: String,
    #[serde(rename = "awayTeam")]
    pub away_team_id: String,
    #[serde(rename = "homeScore")]
    pub home_score: Option<i32>,
    #[serde(rename = "awayScore")]
    pub away_score: Option<i32>,
    pub status: String,
    #[serde(rename = "scheduledDate")]
    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    pub calculated: bool,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::NaiveDateTime>,
}

impl Fixture {
    pub fn match_status(&self) -> FixtureStatus {
        FixtureStatus::parse(&self.status)
    }

    pub fn is_finished(&self) -> bool {
        self.match_status() == FixtureStatus::Finished
    }

    /// The result to score against. Some only for finished fixtures with both
    /// scores present; a finished fixture missing a score is stale upstream
    /// data and stays unscored.
    pub fn final_score(&self) -> Option<(i32, i32)> {
        if !self.is_finished() {
            return None;
        }
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(status: &str, home: Option<i32>, away: Option<i32>) -> Fixture {
        Fixture {
            id: 1001,
            season: "2025-26".to_string(),
            home_team_id: "arsenal".to_string(),
            away_team_id: "chelsea".to_string(),
            home_score: home,
            away_score: away,
            status: status.to_string(),
            scheduled_date: chrono::Utc::now(),
            calculated: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn status_parsing_covers_api_values() {
        assert_eq!(FixtureStatus::parse("FINISHED"), FixtureStatus::Finished);
        assert_eq!(FixtureStatus::parse("IN_PLAY"), FixtureStatus::InPlay);
        assert_eq!(FixtureStatus::parse("PAUSED"), FixtureStatus::InPlay);
        assert_eq!(FixtureStatus::parse("TIMED"), FixtureStatus::Timed);
        assert_eq!(FixtureStatus::parse("SCHEDULED"), FixtureStatus::Scheduled);
        assert_eq!(FixtureStatus::parse("POSTPONED"), FixtureStatus::NotStarted);
    }

    #[test]
    fn started_statuses_lock_guesses() {
        assert!(FixtureStatus::Finished.has_started());
        assert!(FixtureStatus::InPlay.has_started());
        assert!(!FixtureStatus::Timed.has_started());
        assert!(!FixtureStatus::Scheduled.has_started());
        assert!(!FixtureStatus::NotStarted.has_started());
    }

    #[test]
    fn final_score_requires_finished_status() {
        assert_eq!(
            fixture("FINISHED", Some(2), Some(1)).final_score(),
            Some((2, 1))
        );
        assert_eq!(fixture("IN_PLAY", Some(2), Some(1)).final_score(), None);
        assert_eq!(fixture("FINISHED", Some(2), None).final_score(), None);
    }
}
