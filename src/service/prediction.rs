use crate::models::prediction::{SavePredictionSchema, ScoreGuess};
use crate::models::response::LeaderboardEntry;
use crate::repository::database::RepositoryError;
use crate::scoring::validation::{
    locked_fixture_issues, validate_fixture_predictions, validate_table_prediction,
};
use crate::service::recalculation::{recalculate_one, RecalculationError, UserRunOutcome};
use crate::AppState;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder};
use chrono::{DateTime, Utc};
use log::{error, warn};
use serde_json::json;
use std::collections::BTreeMap;
use validator::Validate;

fn deadline_passed(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match deadline {
        Some(deadline) => now > deadline,
        None => false,
    }
}

/// Saves a user's prediction and immediately rescores them. Invalid payloads
/// are rejected here with the full list of problems, instead of silently
/// scoring as zero on the next run.
pub async fn save_prediction_service(
    data: Data<AppState>,
    for_user: String,
    body: Json<SavePredictionSchema>,
) -> impl Responder {
    if deadline_passed(data.config.prediction_deadline, Utc::now()) {
        return HttpResponse::Forbidden().json(json!({
            "status": "failed",
            "message": "The prediction deadline has passed"
        }));
    }

    let body = body.into_inner();
    if let Err(validation_errors) = body.validate() {
        return HttpResponse::BadRequest().json(json!({
            "status": "failed",
            "message": "Invalid prediction payload",
            "errors": validation_errors,
        }));
    }

    let season = &data.config.season;
    let fixtures = match data.db.find_fixtures(season).await {
        Ok(fixtures) => fixtures,
        Err(err) => {
            error!(
                "An error occurred while loading fixtures to validate a prediction. The error: {:?}",
                err
            );
            return HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }));
        }
    };

    let mut issues = validate_table_prediction(&body.table_prediction, &data.teams.known_team_ids());
    issues.extend(validate_fixture_predictions(&body.fixture_predictions));
    issues.extend(locked_fixture_issues(&body.fixture_predictions, &fixtures));
    if !issues.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "status": "failed",
            "message": "Invalid prediction payload",
            "errors": issues,
        }));
    }

    // canonical string keys, deterministic order
    let normalized_guesses: BTreeMap<String, ScoreGuess> = body
        .fixture_predictions
        .iter()
        .map(|(fixture_id, guess)| (fixture_id.trim().to_string(), *guess))
        .collect();

    let table_json = match serde_json::to_string(&body.table_prediction) {
        Ok(json) => json,
        Err(err) => {
            error!("Failed to serialize a table prediction. The error: {:?}", err);
            return HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }));
        }
    };
    let fixtures_json = match serde_json::to_string(&normalized_guesses) {
        Ok(json) => json,
        Err(err) => {
            error!("Failed to serialize fixture predictions. The error: {:?}", err);
            return HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }));
        }
    };

    match data
        .db
        .save_prediction(&for_user, season, &table_json, &fixtures_json)
        .await
    {
        Ok(()) => {}
        Err(RepositoryError::PredictionRowMissing { .. }) => {
            return HttpResponse::NotFound().json(json!({
                "status": "failed",
                "message": format!("No prediction row for user {for_user} in season {season}"),
            }));
        }
        Err(err) => {
            error!(
                "An error occurred while saving a prediction for user {}. The error: {:?}",
                for_user, err
            );
            return HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }));
        }
    }

    // the save already happened; scoring problems downgrade to a note
    match recalculate_one(&data.db, &for_user, season).await {
        Ok(UserRunOutcome::Scored { scores }) => HttpResponse::Ok().json(json!({
            "status": "success",
            "result": scores,
        })),
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "status": "success",
            "result": outcome,
        })),
        Err(RecalculationError::MissingStandings(_))
        | Err(RecalculationError::MissingFixtures(_)) => HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Prediction saved; points pending the first data refresh",
        })),
        Err(err) => {
            warn!(
                "Prediction saved for user {} but rescoring failed. The error: {:?}",
                for_user, err
            );
            HttpResponse::Ok().json(json!({
                "status": "success",
                "message": "Prediction saved; points will update on the next recalculation",
            }))
        }
    }
}

/// Creates the signup-time default prediction: every team in alphabetical
/// order and no fixture guesses. Safe to call twice, the second call is a
/// no-op.
pub async fn create_default_prediction_service(
    data: Data<AppState>,
    for_user: String,
) -> impl Responder {
    let default_order = data.teams.default_table_order();
    let table_json = match serde_json::to_string(&default_order) {
        Ok(json) => json,
        Err(err) => {
            error!(
                "Failed to serialize the default table order. The error: {:?}",
                err
            );
            return HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }));
        }
    };

    match data
        .db
        .create_default_prediction(&for_user, &data.config.season, &table_json)
        .await
    {
        Ok(()) => HttpResponse::Created().json(json!({
            "status": "success",
            "message": "Default prediction created",
        })),
        Err(err) => {
            error!(
                "An error occurred while creating a default prediction for user {}. The error: {:?}",
                for_user, err
            );
            HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }))
        }
    }
}

pub async fn leaderboard_service(data: Data<AppState>) -> impl Responder {
    match data.db.find_leaderboard(&data.config.season).await {
        Ok(rows) => {
            let entries: Vec<LeaderboardEntry> =
                rows.iter().map(LeaderboardEntry::from).collect();
            HttpResponse::Ok().json(json!({
                "status": "success",
                "leaderboard": entries,
            }))
        }
        Err(err) => {
            error!(
                "An error occurred in the leaderboard_service function. The error: {:?}",
                err
            );
            HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "An error occurred"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn no_deadline_keeps_predictions_open() {
        let now = Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap();
        assert!(!deadline_passed(None, now));
    }

    #[test]
    fn saves_before_the_deadline_are_allowed() {
        let deadline = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();
        let just_before = Utc.with_ymd_and_hms(2025, 8, 15, 17, 59, 59).unwrap();
        assert!(!deadline_passed(Some(deadline), just_before));
        assert!(!deadline_passed(Some(deadline), deadline));
    }

    #[test]
    fn saves_after_the_deadline_are_rejected() {
        let deadline = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 1).unwrap();
        assert!(deadline_passed(Some(deadline), after));
    }
}
