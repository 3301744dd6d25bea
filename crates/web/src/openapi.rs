use utoipa::OpenApi;
use utoipa::openapi::server::Server;

use crate::features::{athletes, metrics};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athlete Performance API",
        version = "1.0.0",
        description = "API for managing athletes and their performance metrics"
    ),
    paths(
        athletes::handlers::list_athletes,
        athletes::handlers::get_athlete,
        athletes::handlers::create_athlete,
        athletes::handlers::update_athlete,
        athletes::handlers::delete_athlete,
        metrics::handlers::create_metric,
        metrics::handlers::list_metrics,
    ),
    components(
        schemas(
            storage::dto::athlete::CreateAthleteRequest,
            storage::dto::athlete::UpdateAthleteRequest,
            storage::dto::athlete::AthleteResponse,
            storage::dto::athlete::AthleteDetailResponse,
            storage::dto::athlete::AthleteSortField,
            storage::dto::common::SortOrder,
            storage::dto::metric::CreateMetricRequest,
            storage::dto::metric::MetricResponse,
        )
    ),
    tags(
        (name = "athletes", description = "Athlete management endpoints"),
        (name = "metrics", description = "Performance metric endpoints"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document whose paths resolve under `api_prefix`
pub fn document(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    let url = if api_prefix.is_empty() { "/" } else { api_prefix };
    openapi.servers = Some(vec![Server::new(url)]);
    openapi
}
