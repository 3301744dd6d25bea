use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::metric::{CreateMetricRequest, MetricListQuery, MetricResponse};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/athletes/{id}/metrics",
    params(
        ("id" = String, Path, description = "The unique identifier of the athlete")
    ),
    request_body = CreateMetricRequest,
    responses(
        (status = 201, description = "Metric recorded successfully", body = MetricResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "metrics"
)]
pub async fn create_metric(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CreateMetricRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let metric = services::create_metric(state.metrics(), &id, &req).await?;

    Ok((StatusCode::CREATED, Json(MetricResponse::from(metric))).into_response())
}

#[utoipa::path(
    get,
    path = "/athletes/{id}/metrics",
    params(
        ("id" = String, Path, description = "The unique identifier of the athlete"),
        MetricListQuery
    ),
    responses(
        (status = 200, description = "Metrics of the athlete; empty when the athlete does not exist", body = Vec<MetricResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "metrics"
)]
pub async fn list_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<MetricListQuery>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(query) = query?;

    let metrics = services::list_metrics(state.metrics(), &id, query.metric_type()).await?;

    let response: Vec<MetricResponse> = metrics.into_iter().map(MetricResponse::from).collect();

    Ok(Json(response).into_response())
}
