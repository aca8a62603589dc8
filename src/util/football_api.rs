use crate::config::config::{Config, TeamDirectory};
use crate::models::fixture::{Fixture, FixtureStatus};
use crate::models::standings::StandingsEntry;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FootballApiError {
    #[error("request to the football api failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no team id mapping for '{0}'")]
    UnmappedTeam(String),
    #[error("unexpected payload from the football api: {0}")]
    Payload(String),
}

pub struct FootballApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// The api filters by the season's starting year, so "2025-26" becomes "2025".
fn season_start_year(season: &str) -> &str {
    season.split('-').next().unwrap_or(season)
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    standings: Vec<StandingsTable>,
}

#[derive(Debug, Deserialize)]
struct StandingsTable {
    #[serde(rename = "type")]
    table_type: String,
    table: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    position: i32,
    team: TeamRef,
    #[serde(rename = "playedGames")]
    played_games: i32,
    won: i32,
    draw: i32,
    lost: i32,
    #[serde(rename = "goalsFor")]
    goals_for: i32,
    #[serde(rename = "goalsAgainst")]
    goals_against: i32,
    #[serde(rename = "goalDifference")]
    goal_difference: i32,
    points: i32,
}

#[derive(Debug, Deserialize)]
struct TeamRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    id: i32,
    #[serde(rename = "utcDate")]
    utc_date: String,
    status: String,
    #[serde(rename = "homeTeam")]
    home_team: TeamRef,
    #[serde(rename = "awayTeam")]
    away_team: TeamRef,
    score: ApiScore,
}

#[derive(Debug, Deserialize)]
struct ApiScore {
    #[serde(rename = "fullTime")]
    full_time: ApiFullTime,
}

#[derive(Debug, Deserialize)]
struct ApiFullTime {
    home: Option<i32>,
    away: Option<i32>,
}

impl FootballApiClient {
    pub fn new(config: &Config) -> Self {
        FootballApiClient {
            http: reqwest::Client::new(),
            base_url: config.football_api_url.to_owned(),
            token: config.football_api_token.to_owned(),
        }
    }

    pub async fn fetch_standings(
        &self,
        for_season: &str,
        teams: &TeamDirectory,
    ) -> Result<Vec<StandingsEntry>, FootballApiError> {
        let url = format!("{}/standings", self.base_url);
        let response: StandingsResponse = self
            .http
            .get(url)
            .query(&[("season", season_start_year(for_season))])
            .header("X-Auth-Token", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let table = response
            .standings
            .into_iter()
            .find(|standing| standing.table_type == "TOTAL")
            .ok_or_else(|| FootballApiError::Payload("no TOTAL standings table".to_string()))?;

        let mut entries = Vec::with_capacity(table.table.len());
        for row in table.table {
            let team_id = teams
                .team_id(&row.team.name)
                .ok_or_else(|| FootballApiError::UnmappedTeam(row.team.name.to_owned()))?;
            entries.push(StandingsEntry {
                team_id: team_id.to_string(),
                season: for_season.to_string(),
                position: row.position,
                played: row.played_games,
                wins: row.won,
                draws: row.draw,
                losses: row.lost,
                goals_for: row.goals_for,
                goals_against: row.goals_against,
                goal_difference: row.goal_difference,
                points: row.points,
                created_at: Some(Utc::now().naive_utc()),
                updated_at: Some(Utc::now().naive_utc()),
            });
        }
        Ok(entries)
    }

    pub async fn fetch_fixtures(
        &self,
        for_season: &str,
        teams: &TeamDirectory,
    ) -> Result<Vec<Fixture>, FootballApiError> {
        let url = format!("{}/matches", self.base_url);
        let response: MatchesResponse = self
            .http
            .get(url)
            .query(&[("season", season_start_year(for_season))])
            .header("X-Auth-Token", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut fixtures = Vec::with_capacity(response.matches.len());
        for api_match in response.matches {
            let home_team_id = teams
                .team_id(&api_match.home_team.name)
                .ok_or_else(|| FootballApiError::UnmappedTeam(api_match.home_team.name.to_owned()))?
                .to_string();
            let away_team_id = teams
                .team_id(&api_match.away_team.name)
                .ok_or_else(|| FootballApiError::UnmappedTeam(api_match.away_team.name.to_owned()))?
                .to_string();
            let scheduled_date = DateTime::parse_from_rfc3339(&api_match.utc_date)
                .map_err(|_| {
                    FootballApiError::Payload(format!(
                        "bad utcDate '{}' on match {}",
                        api_match.utc_date, api_match.id
                    ))
                })?
                .with_timezone(&Utc);

            let status = FixtureStatus::parse(&api_match.status);
            // scores only land on finished fixtures; live scores stay null
            let (home_score, away_score) = if status == FixtureStatus::Finished {
                (api_match.score.full_time.home, api_match.score.full_time.away)
            } else {
                (None, None)
            };

            fixtures.push(Fixture {
                id: api_match.id,
                season: for_season.to_string(),
                home_team_id,
                away_team_id,
                home_score,
                away_score,
                status: status.as_str().to_string(),
                scheduled_date,
                calculated: false,
                created_at: Some(Utc::now().naive_utc()),
                updated_at: Some(Utc::now().naive_utc()),
            });
        }
        Ok(fixtures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_start_year_strips_the_suffix() {
        assert_eq!(season_start_year("2025-26"), "2025");
        assert_eq!(season_start_year("2024-25"), "2024");
        assert_eq!(season_start_year("2025"), "2025");
    }
}
