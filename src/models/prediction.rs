use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

/// A user's score guess for one fixture.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreGuess {
    pub home: i32,
    pub away: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::models::schema::predictions)]
pub struct UserPrediction {
    pub user_id: String,
    pub season: String,
    #[serde(rename = "tablePrediction")]
    pub table_prediction: String,
    #[serde(rename = "fixturePredictions")]
    pub fixture_predictions: String,
    #[serde(rename = "tablePoints")]
    pub table_points: i32,
    #[serde(rename = "fixturePoints")]
    pub fixture_points: i32,
    #[serde(rename = "exactPredictions")]
    pub exact_predictions: i32,
    #[serde(rename = "resultPredictions")]
    pub result_predictions: i32,
    #[serde(rename = "totalPoints")]
    pub total_points: i32,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::NaiveDateTime>,
}

impl UserPrediction {
    /// The stored table prediction, or None when the stored JSON is not an
    /// array of strings at all. Length and duplicate checks are the scoring
    /// side's business, not the parser's.
    pub fn parsed_table_prediction(&self) -> Option<Vec<String>> {
        serde_json::from_str::<Vec<String>>(&self.table_prediction).ok()
    }

    /// The stored fixture predictions, normalized to canonical string keys.
    /// Older rows carry scores as JSON strings ("2" instead of 2); those are
    /// accepted here so the scoring code only ever sees clean integers.
    /// Entries with missing, non-numeric or negative scores are dropped.
    pub fn parsed_fixture_predictions(&self) -> HashMap<String, ScoreGuess> {
        let parsed: Value = match serde_json::from_str(&self.fixture_predictions) {
            Ok(value) => value,
            Err(_) => return HashMap::new(),
        };
        let entries = match parsed.as_object() {
            Some(map) => map,
            None => return HashMap::new(),
        };

        let mut guesses = HashMap::new();
        for (fixture_id, guess) in entries {
            let home = guess.get("home").and_then(parse_score);
            let away = guess.get("away").and_then(parse_score);
            if let (Some(home), Some(away)) = (home, away) {
                guesses.insert(fixture_id.trim().to_string(), ScoreGuess { home, away });
            }
        }
        guesses
    }
}

fn parse_score(value: &Value) -> Option<i32> {
    let score = match value {
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    };
    score.filter(|score| *score >= 0)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SavePredictionSchema {
    #[serde(rename = "tablePrediction")]
    #[validate(length(min = 20, max = 20, message = "table prediction must list all 20 teams"))]
    pub table_prediction: Vec<String>,
    #[serde(rename = "fixturePredictions", default)]
    pub fixture_predictions: HashMap<String, ScoreGuess>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(table_json: &str, fixtures_json: &str) -> UserPrediction {
        UserPrediction {
            user_id: "user-1".to_string(),
            season: "2025-26".to_string(),
            table_prediction: table_json.to_string(),
            fixture_predictions: fixtures_json.to_string(),
            table_points: 0,
            fixture_points: 0,
            exact_predictions: 0,
            result_predictions: 0,
            total_points: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn parses_table_prediction_array() {
        let row = prediction(r#"["arsenal","chelsea"]"#, "{}");
        assert_eq!(
            row.parsed_table_prediction(),
            Some(vec!["arsenal".to_string(), "chelsea".to_string()])
        );
    }

    #[test]
    fn rejects_non_array_table_prediction() {
        assert_eq!(prediction("not json", "{}").parsed_table_prediction(), None);
        assert_eq!(
            prediction(r#"{"first":"arsenal"}"#, "{}").parsed_table_prediction(),
            None
        );
    }

    #[test]
    fn normalizes_stringly_typed_scores() {
        let row = prediction("[]", r#"{"1001":{"home":"2","away":1}}"#);
        let guesses = row.parsed_fixture_predictions();
        assert_eq!(guesses.get("1001"), Some(&ScoreGuess { home: 2, away: 1 }));
    }

    #[test]
    fn drops_malformed_and_negative_guesses() {
        let row = prediction(
            "[]",
            r#"{"1":{"home":2,"away":-1},"2":{"home":"two","away":0},"3":{"home":1},"4":{"home":0,"away":0}}"#,
        );
        let guesses = row.parsed_fixture_predictions();
        assert_eq!(guesses.len(), 1);
        assert_eq!(guesses.get("4"), Some(&ScoreGuess { home: 0, away: 0 }));
    }

    #[test]
    fn malformed_fixture_json_yields_no_guesses() {
        assert!(prediction("[]", "[1,2,3]")
            .parsed_fixture_predictions()
            .is_empty());
        assert!(prediction("[]", "oops")
            .parsed_fixture_predictions()
            .is_empty());
    }
}
