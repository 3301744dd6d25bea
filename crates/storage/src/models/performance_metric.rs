use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A single measurement owned by one athlete. Never updated in place;
/// removed only when the owning athlete is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PerformanceMetric {
    pub metric_id: Uuid,
    pub athlete_id: Uuid,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
}
