use crate::models::fixture::Fixture;
use crate::models::prediction::UserPrediction;
use crate::models::standings::{build_standings_lookup, StandingsEntry, StandingsLookup};
use crate::repository::database::{Database, RepositoryError};
use crate::scoring::engine::{score_user, ScoreResult};
use crate::scoring::validation::table_structure_issues;
use crate::AppState;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use futures::stream::{self, StreamExt};
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// How many point updates are in flight at once during a full run. Each user
/// writes only their own row, so ordering between them does not matter.
const PERSIST_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum RecalculationError {
    #[error("no standings stored for season {0}")]
    MissingStandings(String),
    #[error("no fixtures stored for season {0}")]
    MissingFixtures(String),
    #[error("no prediction stored for user {user_id} in season {season}")]
    PredictionNotFound { user_id: String, season: String },
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What happened to one user during a run. Scored outcomes have been
/// persisted by the time a driver returns them; Skipped means the stored
/// prediction could not be scored and Failed means the write did not land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UserRunOutcome {
    Scored {
        #[serde(flatten)]
        scores: ScoreResult,
    },
    Skipped {
        #[serde(rename = "userId")]
        user_id: String,
        reason: String,
    },
    Failed {
        #[serde(rename = "userId")]
        user_id: String,
        reason: String,
    },
}

impl UserRunOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            UserRunOutcome::Scored { scores } => &scores.user_id,
            UserRunOutcome::Skipped { user_id, .. } => user_id,
            UserRunOutcome::Failed { user_id, .. } => user_id,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, UserRunOutcome::Scored { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct RecalculationSummary {
    #[serde(rename = "updatedCount")]
    pub updated_count: usize,
    pub results: Vec<UserRunOutcome>,
}

/// The pure core of a recalculation run: scores every user against the same
/// standings and fixtures, one bad row never touching the others. Results
/// come back sorted by user id so repeated runs over unchanged inputs are
/// byte-for-byte identical.
pub fn recalculate_users(
    standings: &[StandingsEntry],
    fixtures: &[Fixture],
    predictions: &[UserPrediction],
) -> Vec<UserRunOutcome> {
    let lookup = build_standings_lookup(standings);
    let mut outcomes: Vec<UserRunOutcome> = predictions
        .iter()
        .map(|row| score_prediction_row(row, &lookup, fixtures))
        .collect();
    outcomes.sort_by(|a, b| a.user_id().cmp(b.user_id()));
    outcomes
}

fn score_prediction_row(
    row: &UserPrediction,
    lookup: &StandingsLookup,
    fixtures: &[Fixture],
) -> UserRunOutcome {
    let table = match row.parsed_table_prediction() {
        Some(table) => table,
        None => {
            return UserRunOutcome::Skipped {
                user_id: row.user_id.to_owned(),
                reason: "stored table prediction is not a JSON array of team ids".to_string(),
            }
        }
    };

    let structural = table_structure_issues(&table);
    if !structural.is_empty() {
        let reason = structural
            .iter()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return UserRunOutcome::Skipped {
            user_id: row.user_id.to_owned(),
            reason,
        };
    }

    let guesses = row.parsed_fixture_predictions();
    UserRunOutcome::Scored {
        scores: score_user(&row.user_id, &table, &guesses, lookup, fixtures),
    }
}

async fn load_inputs(
    db: &Database,
    season: &str,
) -> Result<(Vec<StandingsEntry>, Vec<Fixture>), RecalculationError> {
    let standings = db.find_standings(season).await?;
    if standings.is_empty() {
        return Err(RecalculationError::MissingStandings(season.to_string()));
    }
    let fixtures = db.find_fixtures(season).await?;
    if fixtures.is_empty() {
        return Err(RecalculationError::MissingFixtures(season.to_string()));
    }
    Ok((standings, fixtures))
}

/// Full recompute for every user in the season. Inputs are fetched once,
/// every user is scored from scratch and the derived fields written back.
/// Running it twice with unchanged inputs writes the same numbers twice.
pub async fn recalculate_all(
    db: &Database,
    season: &str,
) -> Result<RecalculationSummary, RecalculationError> {
    let (standings, fixtures) = load_inputs(db, season).await?;
    let predictions = db.find_predictions(season).await?;
    info!(
        "Recalculating season {} for {} users against {} standings rows and {} fixtures",
        season,
        predictions.len(),
        standings.len(),
        fixtures.len()
    );

    let outcomes = recalculate_users(&standings, &fixtures, &predictions);

    let mut results: Vec<UserRunOutcome> = stream::iter(outcomes.into_iter().map(|outcome| async move {
        match outcome {
            UserRunOutcome::Scored { scores } => match db.update_user_points(season, &scores).await {
                Ok(()) => UserRunOutcome::Scored { scores },
                Err(err) => {
                    error!(
                        "Failed to persist points for user {} in season {}. The error: {:?}",
                        scores.user_id, season, err
                    );
                    UserRunOutcome::Failed {
                        user_id: scores.user_id.to_owned(),
                        reason: err.to_string(),
                    }
                }
            },
            skipped => skipped,
        }
    }))
    .buffer_unordered(PERSIST_CONCURRENCY)
    .collect()
    .await;
    results.sort_by(|a, b| a.user_id().cmp(b.user_id()));

    let updated_count = results.iter().filter(|r| r.is_scored()).count();
    info!(
        "Recalculation for season {} done: {} updated, {} not updated",
        season,
        updated_count,
        results.len() - updated_count
    );
    Ok(RecalculationSummary {
        updated_count,
        results,
    })
}

/// Same computation scoped to one user, run right after a prediction save so
/// the new score shows up without waiting for the next global run.
pub async fn recalculate_one(
    db: &Database,
    for_user: &str,
    season: &str,
) -> Result<UserRunOutcome, RecalculationError> {
    let (standings, fixtures) = load_inputs(db, season).await?;
    let row = db.find_prediction(for_user, season).await?.ok_or_else(|| {
        RecalculationError::PredictionNotFound {
            user_id: for_user.to_string(),
            season: season.to_string(),
        }
    })?;

    let lookup = build_standings_lookup(&standings);
    let outcome = score_prediction_row(&row, &lookup, &fixtures);
    if let UserRunOutcome::Scored { scores } = &outcome {
        db.update_user_points(season, scores).await?;
    }
    Ok(outcome)
}

pub async fn recalculate_all_service(data: Data<AppState>) -> impl Responder {
    match recalculate_all(&data.db, &data.config.season).await {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "status": "success",
            "updatedCount": summary.updated_count,
            "results": summary.results,
        })),
        Err(err @ RecalculationError::MissingStandings(_))
        | Err(err @ RecalculationError::MissingFixtures(_)) => {
            HttpResponse::Conflict().json(json!({
                "status": "failed",
                "message": err.to_string(),
            }))
        }
        Err(err) => {
            error!(
                "An error occurred in the recalculate_all_service function. The error: {:?}",
                err
            );
            HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "Recalculation failed"
            }))
        }
    }
}

pub async fn recalculate_one_service(data: Data<AppState>, for_user: String) -> impl Responder {
    match recalculate_one(&data.db, &for_user, &data.config.season).await {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "status": "success",
            "result": outcome,
        })),
        Err(RecalculationError::PredictionNotFound { user_id, season }) => {
            HttpResponse::NotFound().json(json!({
                "status": "failed",
                "message": format!("No prediction for user {user_id} in season {season}"),
            }))
        }
        Err(err @ RecalculationError::MissingStandings(_))
        | Err(err @ RecalculationError::MissingFixtures(_)) => {
            HttpResponse::Conflict().json(json!({
                "status": "failed",
                "message": err.to_string(),
            }))
        }
        Err(err) => {
            error!(
                "An error occurred in the recalculate_one_service function. The error: {:?}",
                err
            );
            HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "Recalculation failed"
            }))
        }
    }
}
