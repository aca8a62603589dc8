use crate::models::prediction::UserPrediction;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
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
}

impl From<&UserPrediction> for LeaderboardEntry {
    fn from(prediction: &UserPrediction) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: prediction.user_id.to_owned(),
            table_points: prediction.table_points,
            fixture_points: prediction.fixture_points,
            total_points: prediction.total_points,
            exact_predictions: prediction.exact_predictions,
            result_predictions: prediction.result_predictions,
        }
    }
}
