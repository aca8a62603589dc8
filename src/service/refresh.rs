use crate::repository::database::RepositoryError;
use crate::service::recalculation::{recalculate_all, RecalculationError};
use crate::util::football_api::{FootballApiClient, FootballApiError};
use crate::AppState;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Api(#[from] FootballApiError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Recalculation(#[from] RecalculationError),
}

/// Pulls the current standings and fixtures from the football API, writes
/// them to the stores and recomputes every user's points against the fresh
/// data. One request-driven pass, no state kept between calls.
pub async fn refresh_season_data(data: &AppState) -> Result<(usize, usize, usize), RefreshError> {
    let season = &data.config.season;
    let api = FootballApiClient::new(&data.config);

    let standings = api.fetch_standings(season, &data.teams).await?;
    let fixtures = api.fetch_fixtures(season, &data.teams).await?;

    let standings_rows = data.db.upsert_standings(&standings).await?;
    let fixture_rows = data.db.upsert_fixtures(&fixtures).await?;
    info!(
        "Refreshed season {}: {} standings rows, {} fixtures",
        season, standings_rows, fixture_rows
    );

    let summary = recalculate_all(&data.db, season).await?;
    Ok((standings_rows, fixture_rows, summary.updated_count))
}

pub async fn refresh_data_service(data: Data<AppState>) -> impl Responder {
    match refresh_season_data(&data).await {
        Ok((standings_rows, fixture_rows, updated_count)) => HttpResponse::Ok().json(json!({
            "status": "success",
            "standingsRows": standings_rows,
            "fixtureRows": fixture_rows,
            "updatedCount": updated_count,
        })),
        Err(RefreshError::Api(err)) => {
            error!(
                "An error occurred while refreshing data from the football api. The error: {:?}",
                err
            );
            HttpResponse::BadGateway().json(json!({
                "status": "failed",
                "message": "Could not refresh data from the football api"
            }))
        }
        Err(err) => {
            error!(
                "An error occurred in the refresh_data_service function. The error: {:?}",
                err
            );
            HttpResponse::InternalServerError().json(json!({
                "status": "failed",
                "message": "Data refresh failed"
            }))
        }
    }
}
