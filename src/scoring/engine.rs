use crate::models::fixture::Fixture;
use crate::models::prediction::ScoreGuess;
use crate::models::standings::StandingsLookup;
use crate::scoring::validation::table_structure_issues;
use serde::Serialize;
use std::collections::HashMap;

pub const TABLE_SIZE: usize = 20;
pub const MAX_POINTS_PER_TEAM: i32 = 20;
pub const EXACT_SCORE_POINTS: i32 = 3;
pub const CORRECT_RESULT_POINTS: i32 = 1;

/// Everything the orchestrator persists for one user after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "tablePoints")]
    pub table_points: i32,
    #[serde(rename = "fixturePoints")]
    pub fixture_points: i32,
    #[serde(rename = "totalPoints")]
    pub total_points: i32,
    #[serde(rename = "exactPredictions")]
    pub exact_predictions: i32,
    #[serde(rename = "resultPredictions")]
    pub result_predictions: i32,
    #[serde(rename = "totalPredictions")]
    pub total_predictions: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureOutcome {
    /// The fixture has no final score yet; not counted as an attempt.
    NotFinished,
    /// Both scores guessed exactly.
    Exact,
    /// Right winner (or draw), wrong score.
    CorrectResult,
    Miss,
}

impl FixtureOutcome {
    pub fn points(&self) -> i32 {
        match self {
            FixtureOutcome::Exact => EXACT_SCORE_POINTS,
            FixtureOutcome::CorrectResult => CORRECT_RESULT_POINTS,
            FixtureOutcome::NotFinished | FixtureOutcome::Miss => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultClass {
    HomeWin,
    AwayWin,
    Draw,
}

fn result_class(home: i32, away: i32) -> ResultClass {
    if home > away {
        ResultClass::HomeWin
    } else if home < away {
        ResultClass::AwayWin
    } else {
        ResultClass::Draw
    }
}

/// Scores a table prediction against the current standings.
///
/// Slot i of the prediction claims position i + 1. Each team is worth
/// `max(0, 20 - |predicted - actual|)` points, so a spot-on placement earns
/// 20 and anything 20 or more places off earns nothing. A predicted team
/// missing from the standings earns 0 rather than a penalty.
pub fn score_table_prediction(prediction: &[String], standings: &StandingsLookup) -> i32 {
    let mut total = 0;
    for (index, team_id) in prediction.iter().enumerate() {
        let predicted_position = index as i32 + 1;
        if let Some(actual_position) = standings.get(team_id) {
            let diff = (predicted_position - actual_position).abs();
            total += (MAX_POINTS_PER_TEAM - diff).max(0);
        }
    }
    total
}

/// Scores one fixture guess against the actual result. Missing actual scores
/// mean the fixture is not finished and the guess is not judged at all.
pub fn score_fixture_prediction(
    predicted_home: i32,
    predicted_away: i32,
    actual_home: Option<i32>,
    actual_away: Option<i32>,
) -> FixtureOutcome {
    let (actual_home, actual_away) = match (actual_home, actual_away) {
        (Some(home), Some(away)) => (home, away),
        _ => return FixtureOutcome::NotFinished,
    };

    if predicted_home == actual_home && predicted_away == actual_away {
        return FixtureOutcome::Exact;
    }
    if result_class(predicted_home, predicted_away) == result_class(actual_home, actual_away) {
        return FixtureOutcome::CorrectResult;
    }
    FixtureOutcome::Miss
}

/// Computes the full score for one user from already-fetched inputs.
///
/// Shape problems degrade instead of failing: a table prediction that is not
/// a 20-team permutation scores 0 table points, and only finished fixtures
/// with a well-formed guess contribute fixture points or counters. The
/// orchestrator owns the skip decision and filters structurally invalid rows
/// before calling in; the zero-fill here is the fallback for direct callers
/// and must stay in line with that filter.
pub fn score_user(
    user_id: &str,
    table_prediction: &[String],
    fixture_predictions: &HashMap<String, ScoreGuess>,
    standings: &StandingsLookup,
    fixtures: &[Fixture],
) -> ScoreResult {
    let table_points = if table_structure_issues(table_prediction).is_empty() {
        score_table_prediction(table_prediction, standings)
    } else {
        0
    };

    let mut fixture_points = 0;
    let mut exact_predictions = 0;
    let mut result_predictions = 0;
    let mut total_predictions = 0;

    for fixture in fixtures {
        let guess = match fixture_predictions.get(&fixture.id.to_string()) {
            Some(guess) => guess,
            None => continue,
        };
        let (actual_home, actual_away) = match fixture.final_score() {
            Some(score) => score,
            None => continue,
        };

        total_predictions += 1;
        let outcome = score_fixture_prediction(
            guess.home,
            guess.away,
            Some(actual_home),
            Some(actual_away),
        );
        fixture_points += outcome.points();
        match outcome {
            FixtureOutcome::Exact => exact_predictions += 1,
            FixtureOutcome::CorrectResult => result_predictions += 1,
            _ => {}
        }
    }

    ScoreResult {
        user_id: user_id.to_string(),
        table_points,
        fixture_points,
        total_points: table_points + fixture_points,
        exact_predictions,
        result_predictions,
        total_predictions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_ids() -> Vec<String> {
        (1..=20).map(|n| format!("team{n:02}")).collect()
    }

    fn standings_in_order() -> StandingsLookup {
        team_ids()
            .into_iter()
            .enumerate()
            .map(|(index, team)| (team, index as i32 + 1))
            .collect()
    }

    fn finished_fixture(id: i32, home: i32, away: i32) -> Fixture {
        Fixture {
            id,
            season: "2025-26".to_string(),
            home_team_id: "team01".to_string(),
            away_team_id: "team02".to_string(),
            home_score: Some(home),
            away_score: Some(away),
            status: "FINISHED".to_string(),
            scheduled_date: chrono::Utc::now(),
            calculated: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn pending_fixture(id: i32) -> Fixture {
        Fixture {
            home_score: None,
            away_score: None,
            status: "TIMED".to_string(),
            ..finished_fixture(id, 0, 0)
        }
    }

    fn guesses(entries: &[(i32, i32, i32)]) -> HashMap<String, ScoreGuess> {
        entries
            .iter()
            .map(|(id, home, away)| {
                (
                    id.to_string(),
                    ScoreGuess {
                        home: *home,
                        away: *away,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn perfect_table_prediction_scores_four_hundred() {
        let points = score_table_prediction(&team_ids(), &standings_in_order());
        assert_eq!(points, 400);
    }

    #[test]
    fn reversed_table_prediction_scores_two_hundred() {
        let mut reversed = team_ids();
        reversed.reverse();
        // diffs are 19, 17, ... 1, 1, ... 19; contributions clamp at 0 never fire
        assert_eq!(score_table_prediction(&reversed, &standings_in_order()), 200);
    }

    #[test]
    fn contributions_are_never_negative() {
        let mut standings = StandingsLookup::new();
        // 30 places off, far beyond the 20 point band
        standings.insert("team01".to_string(), 31);
        let prediction = vec!["team01".to_string()];
        assert_eq!(score_table_prediction(&prediction, &standings), 0);
    }

    #[test]
    fn unknown_team_contributes_zero() {
        let mut prediction = team_ids();
        prediction[0] = "wimbledon".to_string();
        let points = score_table_prediction(&prediction, &standings_in_order());
        // remaining 19 teams still land on their exact spots
        assert_eq!(points, 380);
    }

    #[test]
    fn exact_score_outcome() {
        let outcome = score_fixture_prediction(2, 1, Some(2), Some(1));
        assert_eq!(outcome, FixtureOutcome::Exact);
        assert_eq!(outcome.points(), 3);
    }

    #[test]
    fn correct_result_outcome() {
        let outcome = score_fixture_prediction(2, 1, Some(3), Some(0));
        assert_eq!(outcome, FixtureOutcome::CorrectResult);
        assert_eq!(outcome.points(), 1);
    }

    #[test]
    fn draw_guessed_as_draw_is_correct_result() {
        let outcome = score_fixture_prediction(1, 1, Some(2), Some(2));
        assert_eq!(outcome, FixtureOutcome::CorrectResult);
    }

    #[test]
    fn wrong_outcome_scores_nothing() {
        let outcome = score_fixture_prediction(2, 1, Some(1), Some(2));
        assert_eq!(outcome, FixtureOutcome::Miss);
        assert_eq!(outcome.points(), 0);
    }

    #[test]
    fn unfinished_fixture_is_not_judged() {
        let outcome = score_fixture_prediction(2, 1, None, None);
        assert_eq!(outcome, FixtureOutcome::NotFinished);
        assert_eq!(outcome.points(), 0);
    }

    #[test]
    fn score_user_aggregates_both_algorithms() {
        let fixtures = vec![
            finished_fixture(1, 2, 1),
            finished_fixture(2, 3, 0),
            finished_fixture(3, 1, 2),
            pending_fixture(4),
        ];
        // exact, correct result, miss, and a guess on a pending fixture
        let guesses = guesses(&[(1, 2, 1), (2, 1, 0), (3, 2, 1), (4, 5, 5)]);
        let result = score_user(
            "user-1",
            &team_ids(),
            &guesses,
            &standings_in_order(),
            &fixtures,
        );

        assert_eq!(result.table_points, 400);
        assert_eq!(result.fixture_points, 4);
        assert_eq!(result.total_points, 404);
        assert_eq!(result.exact_predictions, 1);
        assert_eq!(result.result_predictions, 1);
        assert_eq!(result.total_predictions, 3);
    }

    #[test]
    fn pending_fixture_is_excluded_from_attempt_count() {
        let fixtures = vec![pending_fixture(9)];
        let guesses = guesses(&[(9, 1, 0)]);
        let result = score_user(
            "user-1",
            &team_ids(),
            &guesses,
            &standings_in_order(),
            &fixtures,
        );
        assert_eq!(result.fixture_points, 0);
        assert_eq!(result.total_predictions, 0);
    }

    #[test]
    fn short_table_prediction_scores_zero_table_points() {
        let fixtures = vec![finished_fixture(1, 1, 0)];
        let guesses = guesses(&[(1, 1, 0)]);
        let short: Vec<String> = team_ids().into_iter().take(19).collect();
        let result = score_user(
            "user-1",
            &short,
            &guesses,
            &standings_in_order(),
            &fixtures,
        );
        assert_eq!(result.table_points, 0);
        // fixture scoring still runs
        assert_eq!(result.fixture_points, 3);
        assert_eq!(result.total_points, 3);
    }

    #[test]
    fn total_is_table_plus_fixture_points() {
        let fixtures = vec![finished_fixture(1, 2, 2)];
        let guesses = guesses(&[(1, 0, 0)]);
        let result = score_user(
            "user-1",
            &team_ids(),
            &guesses,
            &standings_in_order(),
            &fixtures,
        );
        assert_eq!(
            result.total_points,
            result.table_points + result.fixture_points
        );
    }
}
