use storage::{
    MetricRepository,
    dto::metric::CreateMetricRequest,
    error::{Result, StorageError},
    models::PerformanceMetric,
};

use crate::features::athletes::services::parse_athlete_id;

/// Record a metric; an unknown or malformed athlete id is a not-found outcome
pub async fn create_metric(
    repo: &dyn MetricRepository,
    athlete_id: &str,
    request: &CreateMetricRequest,
) -> Result<PerformanceMetric> {
    let athlete_id = parse_athlete_id(athlete_id).ok_or(StorageError::NotFound("Athlete"))?;
    let metric = repo.create(athlete_id, request).await?;
    tracing::info!(
        %athlete_id,
        metric_type = %metric.metric_type,
        "Performance metric recorded"
    );
    Ok(metric)
}

/// List an athlete's metrics, optionally narrowed to one type.
///
/// Unlike creation this never reports a missing athlete: the lookup is a
/// plain filter on the owner id, so an unknown (or malformed) id simply
/// yields an empty list.
pub async fn list_metrics(
    repo: &dyn MetricRepository,
    athlete_id: &str,
    metric_type: Option<&str>,
) -> Result<Vec<PerformanceMetric>> {
    match parse_athlete_id(athlete_id) {
        Some(athlete_id) => repo.list_for_athlete(athlete_id, metric_type).await,
        None => Ok(Vec::new()),
    }
}
