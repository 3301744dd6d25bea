use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::non_empty;
use crate::models::PerformanceMetric;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse {
    pub id: Uuid,
    pub athlete_id: Uuid,
    /// Free-form tag such as "speed" or "strength"
    pub metric_type: String,
    pub value: f64,
    /// Unit of measurement, e.g. "m/s" or "kg"
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl From<PerformanceMetric> for MetricResponse {
    fn from(metric: PerformanceMetric) -> Self {
        Self {
            id: metric.metric_id,
            athlete_id: metric.athlete_id,
            metric_type: metric.metric_type,
            value: metric.value,
            unit: metric.unit,
            timestamp: metric.recorded_at,
        }
    }
}

/// Request payload for recording a metric against an athlete
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"metricType": "speed", "value": 9.8, "unit": "m/s"}))]
pub struct CreateMetricRequest {
    #[validate(length(min = 1, max = 100, message = "Metric type must be between 1 and 100 characters"))]
    pub metric_type: String,

    pub value: f64,

    #[validate(length(min = 1, max = 50, message = "Unit must be between 1 and 50 characters"))]
    pub unit: String,

    /// When the measurement was taken; defaults to the time of creation
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MetricListQuery {
    /// Exact-match filter on the metric type, e.g. "speed"
    pub metric_type: Option<String>,
}

impl MetricListQuery {
    pub fn metric_type(&self) -> Option<&str> {
        non_empty(self.metric_type.as_deref())
    }
}
