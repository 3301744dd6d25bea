use axum::{Router, routing::get};

use super::handlers::{create_metric, list_metrics};
use crate::state::AppState;

/// Metric routes, relative to the athletes mount point
pub fn routes() -> Router<AppState> {
    Router::new().route("/:id/metrics", get(list_metrics).post(create_metric))
}
