//! Storage collaborator seam. Handlers only ever see these traits, so the
//! PostgreSQL implementations can be swapped for [`memory::InMemoryRepository`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::dto::athlete::{
    AthleteDetailResponse, AthleteListFilter, CreateAthleteRequest, UpdateAthleteRequest,
};
use crate::dto::metric::CreateMetricRequest;
use crate::error::Result;
use crate::models::{Athlete, PerformanceMetric};

pub mod athlete;
pub mod memory;
pub mod metric;

pub use athlete::PgAthleteRepository;
pub use memory::InMemoryRepository;
pub use metric::PgMetricRepository;

#[async_trait]
pub trait AthleteRepository: Send + Sync {
    async fn create(&self, req: &CreateAthleteRequest) -> Result<Athlete>;

    /// Creates the athlete and all of `metrics` as one unit: either every
    /// row is stored or none is
    async fn create_with_metrics(
        &self,
        req: &CreateAthleteRequest,
        metrics: &[CreateMetricRequest],
    ) -> Result<AthleteDetailResponse>;

    /// At most `filter.pagination.limit()` athletes, without their metrics
    async fn list(&self, filter: &AthleteListFilter) -> Result<Vec<Athlete>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Athlete>;

    /// Athlete plus all of its metrics, ordered by timestamp
    async fn find_detailed(&self, id: Uuid) -> Result<AthleteDetailResponse>;

    async fn update(&self, id: Uuid, req: &UpdateAthleteRequest) -> Result<Athlete>;

    /// Deletes the athlete and, by cascade, its metrics
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Fails with `NotFound("Athlete")` when the owner does not exist
    async fn create(&self, athlete_id: Uuid, req: &CreateMetricRequest)
    -> Result<PerformanceMetric>;

    /// Pure filter on the owner id; an unknown athlete yields an empty list
    async fn list_for_athlete(
        &self,
        athlete_id: Uuid,
        metric_type: Option<&str>,
    ) -> Result<Vec<PerformanceMetric>>;
}
