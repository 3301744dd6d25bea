use std::sync::Arc;

use storage::{AthleteRepository, Database, InMemoryRepository, MetricRepository};

/// Repositories shared by every handler. Holds no request state.
#[derive(Clone)]
pub struct AppState {
    athletes: Arc<dyn AthleteRepository>,
    metrics: Arc<dyn MetricRepository>,
}

impl AppState {
    pub fn new(athletes: Arc<dyn AthleteRepository>, metrics: Arc<dyn MetricRepository>) -> Self {
        Self { athletes, metrics }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(Arc::new(db.athletes()), Arc::new(db.metrics()))
    }

    pub fn in_memory(repo: Arc<InMemoryRepository>) -> Self {
        Self::new(repo.clone(), repo)
    }

    pub fn athletes(&self) -> &dyn AthleteRepository {
        self.athletes.as_ref()
    }

    pub fn metrics(&self) -> &dyn MetricRepository {
        self.metrics.as_ref()
    }
}
