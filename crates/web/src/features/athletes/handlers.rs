use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::athlete::{
    AthleteDetailResponse, AthleteListFilter, AthleteListQuery, AthleteResponse,
    CreateAthleteRequest, UpdateAthleteRequest,
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/athletes",
    params(AthleteListQuery),
    responses(
        (status = 200, description = "Page of athletes matching the filter", body = Vec<AthleteResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "athletes"
)]
pub async fn list_athletes(
    State(state): State<AppState>,
    query: Result<Query<AthleteListQuery>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(query) = query?;
    let filter = AthleteListFilter::try_from(&query)?;

    let athletes = services::list_athletes(state.athletes(), &filter).await?;

    let response: Vec<AthleteResponse> = athletes.into_iter().map(AthleteResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/athletes/{id}",
    params(
        ("id" = String, Path, description = "The unique identifier of the athlete")
    ),
    responses(
        (status = 200, description = "Athlete details with performance metrics", body = AthleteDetailResponse),
        (status = 404, description = "Athlete not found")
    ),
    tag = "athletes"
)]
pub async fn get_athlete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let athlete = services::get_athlete_detailed(state.athletes(), &id).await?;

    Ok(Json(athlete).into_response())
}

#[utoipa::path(
    post,
    path = "/athletes",
    request_body = CreateAthleteRequest,
    responses(
        (status = 201, description = "Athlete created successfully", body = AthleteResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "athletes"
)]
pub async fn create_athlete(
    State(state): State<AppState>,
    payload: Result<Json<CreateAthleteRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let athlete = services::create_athlete(state.athletes(), &req).await?;

    Ok((StatusCode::CREATED, Json(AthleteResponse::from(athlete))).into_response())
}

#[utoipa::path(
    put,
    path = "/athletes/{id}",
    params(
        ("id" = String, Path, description = "The unique identifier of the athlete")
    ),
    request_body = UpdateAthleteRequest,
    responses(
        (status = 200, description = "Athlete updated successfully", body = AthleteResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "athletes"
)]
pub async fn update_athlete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAthleteRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(update_req) = payload?;
    update_req.validate()?;

    let updated = services::update_athlete(state.athletes(), &id, &update_req).await?;

    Ok(Json(AthleteResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/athletes/{id}",
    params(
        ("id" = String, Path, description = "The unique identifier of the athlete")
    ),
    responses(
        (status = 204, description = "Athlete deleted successfully"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "athletes"
)]
pub async fn delete_athlete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    services::delete_athlete(state.athletes(), &id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
