use chrono::{DateTime, Utc};
use dotenv::dotenv;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub season: String,
    pub football_api_url: String,
    pub football_api_token: String,
    pub prediction_deadline: Option<DateTime<Utc>>,
}

impl Config {
    pub fn init() -> Config {
        dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let season = std::env::var("SEASON").expect("SEASON must be set");
        let football_api_url =
            std::env::var("FOOTBALL_API_URL").expect("FOOTBALL_API_URL must be set");
        let football_api_token =
            std::env::var("FOOTBALL_API_TOKEN").expect("FOOTBALL_API_TOKEN must be set");
        let prediction_deadline =
            std::env::var("PREDICTION_DEADLINE").unwrap_or_else(|_| String::new());

        let prediction_deadline = if prediction_deadline.is_empty() {
            None // no deadline configured, predictions stay open
        } else {
            Some(
                DateTime::parse_from_rfc3339(&prediction_deadline)
                    .expect("Failed to parse PREDICTION_DEADLINE as RFC 3339")
                    .with_timezone(&Utc),
            )
        };

        Config {
            database_url,
            season,
            football_api_url,
            football_api_token,
            prediction_deadline,
        }
    }
}

/// Mapping between the football API's team names and our stable team ids.
/// Built once at startup and passed down explicitly so there is a single
/// authoritative list instead of per-module copies.
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    by_api_name: HashMap<String, String>,
}

impl TeamDirectory {
    pub fn premier_league() -> TeamDirectory {
        TeamDirectory::from_pairs(&[
            ("Arsenal FC", "arsenal"),
            ("Aston Villa FC", "aston-villa"),
            ("AFC Bournemouth", "bournemouth"),
            ("Brentford FC", "brentford"),
            ("Brighton & Hove Albion FC", "brighton"),
            ("Burnley FC", "burnley"),
            ("Chelsea FC", "chelsea"),
            ("Crystal Palace FC", "crystal-palace"),
            ("Everton FC", "everton"),
            ("Fulham FC", "fulham"),
            ("Leeds United FC", "leeds"),
            ("Liverpool FC", "liverpool"),
            ("Manchester City FC", "man-city"),
            ("Manchester United FC", "man-united"),
            ("Newcastle United FC", "newcastle"),
            ("Nottingham Forest FC", "nottingham-forest"),
            ("Sunderland AFC", "sunderland"),
            ("Tottenham Hotspur FC", "tottenham"),
            ("West Ham United FC", "west-ham"),
            ("Wolverhampton Wanderers FC", "wolves"),
        ])
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> TeamDirectory {
        let by_api_name = pairs
            .iter()
            .map(|(api_name, team)| (api_name.to_string(), team.to_string()))
            .collect();
        TeamDirectory { by_api_name }
    }

    pub fn team_id(&self, api_name: &str) -> Option<&str> {
        self.by_api_name.get(api_name).map(|team| team.as_str())
    }

    pub fn known_team_ids(&self) -> HashSet<String> {
        self.by_api_name.values().cloned().collect()
    }

    /// Alphabetical team order used as the default table prediction at signup.
    pub fn default_table_order(&self) -> Vec<String> {
        let mut order: Vec<String> = self.by_api_name.values().cloned().collect();
        order.sort();
        order
    }

    pub fn len(&self) -> usize {
        self.by_api_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_api_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premier_league_directory_has_twenty_teams() {
        let teams = TeamDirectory::premier_league();
        assert_eq!(teams.len(), 20);
        assert_eq!(teams.known_team_ids().len(), 20);
    }

    #[test]
    fn default_table_order_is_sorted_and_complete() {
        let teams = TeamDirectory::premier_league();
        let order = teams.default_table_order();
        assert_eq!(order.len(), 20);
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(order.first().map(String::as_str), Some("arsenal"));
    }

    #[test]
    fn maps_api_names_to_team_ids() {
        let teams = TeamDirectory::premier_league();
        assert_eq!(teams.team_id("Wolverhampton Wanderers FC"), Some("wolves"));
        assert_eq!(teams.team_id("FC Bayern Munich"), None);
    }
}
