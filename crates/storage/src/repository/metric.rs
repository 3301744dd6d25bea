use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use super::MetricRepository;
use crate::dto::metric::CreateMetricRequest;
use crate::error::{Result, StorageError};
use crate::models::PerformanceMetric;

pub(super) const INSERT_METRIC: &str = r#"
    INSERT INTO performance_metrics (metric_id, athlete_id, metric_type, value, unit, recorded_at)
    VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
    RETURNING metric_id, athlete_id, metric_type, value, unit, recorded_at
"#;

#[derive(Clone)]
pub struct PgMetricRepository {
    pool: PgPool,
}

impl PgMetricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricRepository for PgMetricRepository {
    async fn create(
        &self,
        athlete_id: Uuid,
        req: &CreateMetricRequest,
    ) -> Result<PerformanceMetric> {
        let result = sqlx::query_as::<_, PerformanceMetric>(INSERT_METRIC)
            .bind(Uuid::new_v4())
            .bind(athlete_id)
            .bind(&req.metric_type)
            .bind(req.value)
            .bind(&req.unit)
            .bind(req.timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from);

        // The foreign key is the existence check for the owning athlete
        match result {
            Err(e) if e.is_foreign_key_violation() => Err(StorageError::NotFound("Athlete")),
            other => other,
        }
    }

    async fn list_for_athlete(
        &self,
        athlete_id: Uuid,
        metric_type: Option<&str>,
    ) -> Result<Vec<PerformanceMetric>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT metric_id, athlete_id, metric_type, value, unit, recorded_at
            FROM performance_metrics
            WHERE athlete_id = "#,
        );
        query.push_bind(athlete_id);

        if let Some(metric_type) = metric_type {
            query.push(" AND metric_type = ");
            query.push_bind(metric_type);
        }

        query.push(" ORDER BY recorded_at, metric_id");

        let metrics = query
            .build_query_as::<PerformanceMetric>()
            .fetch_all(&self.pool)
            .await?;

        Ok(metrics)
    }
}
