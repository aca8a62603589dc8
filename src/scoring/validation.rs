use crate::models::fixture::Fixture;
use crate::models::prediction::ScoreGuess;
use crate::scoring::engine::TABLE_SIZE;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One problem found in a submitted prediction. Returned to the user at save
/// time; the scoring path never sees invalid data as an error, it just scores
/// it as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum PredictionIssue {
    WrongLength { expected: usize, found: usize },
    DuplicateTeam { team_id: String },
    UnknownTeam { team_id: String },
    NegativeScore { fixture_id: String },
    FixtureAlreadyStarted { fixture_id: String },
}

impl fmt::Display for PredictionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionIssue::WrongLength { expected, found } => {
                write!(f, "table prediction has {found} teams, expected {expected}")
            }
            PredictionIssue::DuplicateTeam { team_id } => {
                write!(f, "team '{team_id}' appears more than once")
            }
            PredictionIssue::UnknownTeam { team_id } => {
                write!(f, "team '{team_id}' is not a known team")
            }
            PredictionIssue::NegativeScore { fixture_id } => {
                write!(f, "fixture '{fixture_id}' has a negative score guess")
            }
            PredictionIssue::FixtureAlreadyStarted { fixture_id } => {
                write!(f, "fixture '{fixture_id}' has already kicked off")
            }
        }
    }
}

/// Structural checks only: the right number of slots, each filled with a
/// distinct team. These are the problems that make a table prediction
/// unscorable; unknown teams are not structural, they just score zero.
pub fn table_structure_issues(prediction: &[String]) -> Vec<PredictionIssue> {
    let mut issues = Vec::new();
    if prediction.len() != TABLE_SIZE {
        issues.push(PredictionIssue::WrongLength {
            expected: TABLE_SIZE,
            found: prediction.len(),
        });
    }
    let mut seen = HashSet::new();
    for team_id in prediction {
        if !seen.insert(team_id) {
            issues.push(PredictionIssue::DuplicateTeam {
                team_id: team_id.to_owned(),
            });
        }
    }
    issues
}

/// Full strict validation for the prediction-save path.
pub fn validate_table_prediction(
    prediction: &[String],
    known_teams: &HashSet<String>,
) -> Vec<PredictionIssue> {
    let mut issues = table_structure_issues(prediction);
    for team_id in prediction {
        if !known_teams.contains(team_id) {
            issues.push(PredictionIssue::UnknownTeam {
                team_id: team_id.to_owned(),
            });
        }
    }
    issues
}

pub fn validate_fixture_predictions(
    guesses: &HashMap<String, ScoreGuess>,
) -> Vec<PredictionIssue> {
    let mut bad_fixtures: Vec<String> = guesses
        .iter()
        .filter(|(_, guess)| guess.home < 0 || guess.away < 0)
        .map(|(fixture_id, _)| fixture_id.to_owned())
        .collect();
    bad_fixtures.sort();
    bad_fixtures
        .into_iter()
        .map(|fixture_id| PredictionIssue::NegativeScore { fixture_id })
        .collect()
}

/// Rejects guesses for fixtures that have kicked off. Guesses are only
/// accepted for matches still in the future, so a result that is already
/// known can never be submitted for points. Guesses naming fixtures we have
/// no row for are left alone; they simply never score.
pub fn locked_fixture_issues(
    guesses: &HashMap<String, ScoreGuess>,
    fixtures: &[Fixture],
) -> Vec<PredictionIssue> {
    let mut locked: Vec<String> = fixtures
        .iter()
        .filter(|fixture| fixture.match_status().has_started())
        .map(|fixture| fixture.id.to_string())
        .filter(|fixture_id| guesses.contains_key(fixture_id))
        .collect();
    locked.sort();
    locked
        .into_iter()
        .map(|fixture_id| PredictionIssue::FixtureAlreadyStarted { fixture_id })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(id: i32, status: &str) -> Fixture {
        Fixture {
            id,
            season: "2025-26".to_string(),
            home_team_id: "team01".to_string(),
            away_team_id: "team02".to_string(),
            home_score: None,
            away_score: None,
            status: status.to_string(),
            scheduled_date: chrono::Utc::now(),
            calculated: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn teams(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("team{i:02}")).collect()
    }

    #[test]
    fn complete_distinct_table_has_no_structural_issues() {
        assert!(table_structure_issues(&teams(20)).is_empty());
    }

    #[test]
    fn short_table_is_flagged() {
        let issues = table_structure_issues(&teams(19));
        assert_eq!(
            issues,
            vec![PredictionIssue::WrongLength {
                expected: 20,
                found: 19
            }]
        );
    }

    #[test]
    fn duplicates_are_flagged() {
        let mut prediction = teams(20);
        prediction[19] = "team01".to_string();
        let issues = table_structure_issues(&prediction);
        assert_eq!(
            issues,
            vec![PredictionIssue::DuplicateTeam {
                team_id: "team01".to_string()
            }]
        );
    }

    #[test]
    fn unknown_teams_fail_strict_validation_only() {
        let known: HashSet<String> = teams(20).into_iter().collect();
        let mut prediction = teams(19);
        prediction.push("wanderers".to_string());

        assert!(table_structure_issues(&prediction).is_empty());
        let issues = validate_table_prediction(&prediction, &known);
        assert_eq!(
            issues,
            vec![PredictionIssue::UnknownTeam {
                team_id: "wanderers".to_string()
            }]
        );
    }

    #[test]
    fn guesses_for_started_fixtures_are_flagged() {
        let fixtures = vec![
            fixture(1001, "FINISHED"),
            fixture(1002, "IN_PLAY"),
            fixture(1003, "TIMED"),
        ];
        let mut guesses = HashMap::new();
        guesses.insert("1001".to_string(), ScoreGuess { home: 2, away: 1 });
        guesses.insert("1002".to_string(), ScoreGuess { home: 0, away: 0 });
        guesses.insert("1003".to_string(), ScoreGuess { home: 1, away: 1 });

        let issues = locked_fixture_issues(&guesses, &fixtures);
        assert_eq!(
            issues,
            vec![
                PredictionIssue::FixtureAlreadyStarted {
                    fixture_id: "1001".to_string()
                },
                PredictionIssue::FixtureAlreadyStarted {
                    fixture_id: "1002".to_string()
                },
            ]
        );
    }

    #[test]
    fn future_fixture_guesses_pass_the_lock_check() {
        let fixtures = vec![fixture(1001, "SCHEDULED"), fixture(1002, "FINISHED")];
        let mut guesses = HashMap::new();
        guesses.insert("1001".to_string(), ScoreGuess { home: 3, away: 2 });

        assert!(locked_fixture_issues(&guesses, &fixtures).is_empty());
    }

    #[test]
    fn negative_score_guesses_are_flagged() {
        let mut guesses = HashMap::new();
        guesses.insert("1001".to_string(), ScoreGuess { home: -1, away: 0 });
        guesses.insert("1002".to_string(), ScoreGuess { home: 2, away: 2 });
        let issues = validate_fixture_predictions(&guesses);
        assert_eq!(
            issues,
            vec![PredictionIssue::NegativeScore {
                fixture_id: "1001".to_string()
            }]
        );
    }
}
