use crate::models::prediction::SavePredictionSchema;
use crate::service::prediction::{
    create_default_prediction_service, leaderboard_service, save_prediction_service,
};
use crate::service::recalculation::{recalculate_all_service, recalculate_one_service};
use crate::service::refresh::refresh_data_service;
use crate::AppState;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, put, web, Responder};

#[post("/scores/recalculate")]
async fn recalculate_all_handler(data: Data<AppState>) -> impl Responder {
    recalculate_all_service(data).await
}

#[post("/scores/recalculate/{user_id}")]
async fn recalculate_one_handler(data: Data<AppState>, path: Path<String>) -> impl Responder {
    recalculate_one_service(data, path.into_inner()).await
}

#[post("/data/refresh")]
async fn refresh_data_handler(data: Data<AppState>) -> impl Responder {
    refresh_data_service(data).await
}

#[put("/predictions/{user_id}")]
async fn save_prediction_handler(
    data: Data<AppState>,
    path: Path<String>,
    body: Json<SavePredictionSchema>,
) -> impl Responder {
    save_prediction_service(data, path.into_inner(), body).await
}

#[post("/predictions/{user_id}")]
async fn create_default_prediction_handler(
    data: Data<AppState>,
    path: Path<String>,
) -> impl Responder {
    create_default_prediction_service(data, path.into_inner()).await
}

#[get("/leaderboard")]
async fn leaderboard_handler(data: Data<AppState>) -> impl Responder {
    leaderboard_service(data).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    let scope = web::scope("/api/v1")
        .service(recalculate_all_handler)
        .service(recalculate_one_handler)
        .service(refresh_data_handler)
        .service(save_prediction_handler)
        .service(create_default_prediction_handler)
        .service(leaderboard_handler);

    conf.service(scope);
}
