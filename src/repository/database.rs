use crate::config::config::Config;
use crate::models::fixture::Fixture;
use crate::models::prediction::UserPrediction;
use crate::models::standings::StandingsEntry;
use crate::scoring::engine::ScoreResult;
use chrono::Utc;
use deadpool::managed::Object;
use diesel::{BoolExpressionMethods, ConnectionError, ConnectionResult, ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection, RunQueryDsl,
};
use log::error;
use openssl::ssl::{SslConnector, SslMethod};
use postgres_openssl::MakeTlsConnector;
use thiserror::Error;

pub type DBPool = deadpool::managed::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("no prediction row for user {user_id} in season {season}")]
    PredictionRowMissing { user_id: String, season: String },
}

pub struct Database {
    pool: DBPool,
}

impl Database {
    pub fn new(config: Config) -> Self {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_setup(
            config.database_url,
            |url| Box::pin(Self::establish(url)),
        );
        let pool = Pool::builder(manager)
            .build()
            .expect("Failed to create pool.");
        Database { pool }
    }

    async fn establish(database_url: &str) -> ConnectionResult<AsyncPgConnection> {
        let mut builder = SslConnector::builder(SslMethod::tls()).unwrap();
        builder
            .set_ca_file("./ca-certificates/eu-north-1-root.pem")
            .unwrap();
        let connector = MakeTlsConnector::new(builder.build());
        let (client, connection) = tokio_postgres::connect(database_url, connector)
            .await
            .map_err(|e| ConnectionError::BadConnection(Box::new(e).to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("connection error: {e}");
            }
        });
        AsyncPgConnection::try_from(client).await
    }

    async fn get_db_conn(
        &self,
    ) -> Result<Object<AsyncDieselConnectionManager<AsyncPgConnection>>, RepositoryError> {
        self.pool.get().await.map_err(RepositoryError::Pool)
    }

    pub async fn find_standings(
        &self,
        for_season: &str,
    ) -> Result<Vec<StandingsEntry>, RepositoryError> {
        use crate::models::schema::standings::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let rows = standings
            .filter(season.eq(for_season))
            .order(position.asc())
            .select((
                team_id,
                season,
                position,
                played,
                wins,
                draws,
                losses,
                goals_for,
                goals_against,
                goal_difference,
                points,
                created_at,
                updated_at,
            ))
            .load::<StandingsEntry>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_fixtures(&self, for_season: &str) -> Result<Vec<Fixture>, RepositoryError> {
        use crate::models::schema::fixtures::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let rows = fixtures
            .filter(season.eq(for_season))
            .order(scheduled_date.asc())
            .select((
                id,
                season,
                home_team_id,
                away_team_id,
                home_score,
                away_score,
                status,
                scheduled_date,
                calculated,
                created_at,
                updated_at,
            ))
            .load::<Fixture>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_predictions(
        &self,
        for_season: &str,
    ) -> Result<Vec<UserPrediction>, RepositoryError> {
        use crate::models::schema::predictions::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let rows = predictions
            .filter(season.eq(for_season))
            .order(user_id.asc())
            .select((
                user_id,
                season,
                table_prediction,
                fixture_predictions,
                table_points,
                fixture_points,
                exact_predictions,
                result_predictions,
                total_points,
                created_at,
                updated_at,
            ))
            .load::<UserPrediction>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_prediction(
        &self,
        for_user: &str,
        for_season: &str,
    ) -> Result<Option<UserPrediction>, RepositoryError> {
        use crate::models::schema::predictions::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let row = predictions
            .filter(user_id.eq(for_user).and(season.eq(for_season)))
            .select((
                user_id,
                season,
                table_prediction,
                fixture_predictions,
                table_points,
                fixture_points,
                exact_predictions,
                result_predictions,
                total_points,
                created_at,
                updated_at,
            ))
            .first::<UserPrediction>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    /// Season leaderboard, best total first.
    pub async fn find_leaderboard(
        &self,
        for_season: &str,
    ) -> Result<Vec<UserPrediction>, RepositoryError> {
        use crate::models::schema::predictions::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let rows = predictions
            .filter(season.eq(for_season))
            .order((total_points.desc(), user_id.asc()))
            .select((
                user_id,
                season,
                table_prediction,
                fixture_predictions,
                table_points,
                fixture_points,
                exact_predictions,
                result_predictions,
                total_points,
                created_at,
                updated_at,
            ))
            .load::<UserPrediction>(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Writes one user's derived point fields. The orchestrator calls this
    /// once per user per run; each call is its own statement, so one failing
    /// user never rolls back another.
    pub async fn update_user_points(
        &self,
        for_season: &str,
        scores: &ScoreResult,
    ) -> Result<(), RepositoryError> {
        use crate::models::schema::predictions::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let updated = diesel::update(
            predictions.filter(user_id.eq(&scores.user_id).and(season.eq(for_season))),
        )
        .set((
            table_points.eq(scores.table_points),
            fixture_points.eq(scores.fixture_points),
            total_points.eq(scores.total_points),
            exact_predictions.eq(scores.exact_predictions),
            result_predictions.eq(scores.result_predictions),
            updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)
        .await?;

        if updated == 0 {
            return Err(RepositoryError::PredictionRowMissing {
                user_id: scores.user_id.to_owned(),
                season: for_season.to_owned(),
            });
        }
        Ok(())
    }

    /// Overwrites the user's submitted prediction payloads. Point fields are
    /// left alone; the caller recalculates right after.
    pub async fn save_prediction(
        &self,
        for_user: &str,
        for_season: &str,
        table_json: &str,
        fixtures_json: &str,
    ) -> Result<(), RepositoryError> {
        use crate::models::schema::predictions::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let updated = diesel::update(
            predictions.filter(user_id.eq(for_user).and(season.eq(for_season))),
        )
        .set((
            table_prediction.eq(table_json),
            fixture_predictions.eq(fixtures_json),
            updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)
        .await?;

        if updated == 0 {
            return Err(RepositoryError::PredictionRowMissing {
                user_id: for_user.to_owned(),
                season: for_season.to_owned(),
            });
        }
        Ok(())
    }

    /// Creates the signup-time prediction row: alphabetical table order, no
    /// fixture guesses, zero points. Does nothing if the row already exists.
    pub async fn create_default_prediction(
        &self,
        for_user: &str,
        for_season: &str,
        default_order_json: &str,
    ) -> Result<(), RepositoryError> {
        use crate::models::schema::predictions::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let row = UserPrediction {
            user_id: for_user.to_string(),
            season: for_season.to_string(),
            table_prediction: default_order_json.to_string(),
            fixture_predictions: "{}".to_string(),
            table_points: 0,
            fixture_points: 0,
            exact_predictions: 0,
            result_predictions: 0,
            total_points: 0,
            created_at: Some(Utc::now().naive_utc()),
            updated_at: Some(Utc::now().naive_utc()),
        };
        diesel::insert_into(predictions)
            .values(&row)
            .on_conflict((user_id, season))
            .do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn upsert_standings(
        &self,
        rows: &[StandingsEntry],
    ) -> Result<usize, RepositoryError> {
        use crate::models::schema::standings::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let mut written = 0;
        for row in rows {
            match diesel::insert_into(standings)
                .values(row)
                .on_conflict((team_id, season))
                .do_update()
                .set(row)
                .execute(&mut conn)
                .await
            {
                Ok(_) => written += 1,
                Err(err) => {
                    error!(
                        "Failed to upsert standings row for team {} in season {}. The error: {:?}",
                        row.team_id, row.season, err
                    );
                    return Err(RepositoryError::Database(err));
                }
            }
        }
        Ok(written)
    }

    pub async fn upsert_fixtures(&self, rows: &[Fixture]) -> Result<usize, RepositoryError> {
        use crate::models::schema::fixtures::dsl::*;
        let mut conn = self.get_db_conn().await?;
        let mut written = 0;
        for row in rows {
            match diesel::insert_into(fixtures)
                .values(row)
                .on_conflict(id)
                .do_update()
                .set(row)
                .execute(&mut conn)
                .await
            {
                Ok(_) => written += 1,
                Err(err) => {
                    error!(
                        "Failed to upsert fixture {} in season {}. The error: {:?}",
                        row.id, row.season, err
                    );
                    return Err(RepositoryError::Database(err));
                }
            }
        }
        Ok(written)
    }
}
