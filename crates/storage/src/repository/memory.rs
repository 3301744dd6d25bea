//! Process-local repository backed by plain vectors. Used by the HTTP tests
//! and anywhere a database is not wanted. Rows are kept in insertion order,
//! which doubles as the default listing order.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AthleteRepository, MetricRepository};
use crate::dto::athlete::{
    AthleteDetailResponse, AthleteListFilter, AthleteSortField, CreateAthleteRequest,
    UpdateAthleteRequest,
};
use crate::dto::common::SortOrder;
use crate::dto::metric::CreateMetricRequest;
use crate::error::{Result, StorageError};
use crate::models::{Athlete, PerformanceMetric};

#[derive(Default)]
struct Tables {
    athletes: Vec<Athlete>,
    metrics: Vec<PerformanceMetric>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    calls: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository operations served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn new_metric(athlete_id: Uuid, req: &CreateMetricRequest) -> PerformanceMetric {
        PerformanceMetric {
            metric_id: Uuid::new_v4(),
            athlete_id,
            metric_type: req.metric_type.clone(),
            value: req.value,
            unit: req.unit.clone(),
            recorded_at: req.timestamp.unwrap_or_else(Utc::now),
        }
    }

    fn metrics_of(tables: &Tables, athlete_id: Uuid) -> Vec<PerformanceMetric> {
        let mut metrics: Vec<PerformanceMetric> = tables
            .metrics
            .iter()
            .filter(|m| m.athlete_id == athlete_id)
            .cloned()
            .collect();
        metrics.sort_by_key(|m| (m.recorded_at, m.metric_id));
        metrics
    }
}

fn compare(a: &Athlete, b: &Athlete, field: AthleteSortField) -> CmpOrdering {
    match field {
        AthleteSortField::Name => a.name.cmp(&b.name),
        AthleteSortField::Age => a.age.cmp(&b.age),
        AthleteSortField::Team => a.team.cmp(&b.team),
    }
}

#[async_trait]
impl AthleteRepository for InMemoryRepository {
    async fn create(&self, req: &CreateAthleteRequest) -> Result<Athlete> {
        self.record_call();

        let athlete = Athlete {
            athlete_id: Uuid::new_v4(),
            name: req.name.clone(),
            age: req.age,
            team: req.team.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.athletes.push(athlete.clone());

        Ok(athlete)
    }

    async fn create_with_metrics(
        &self,
        req: &CreateAthleteRequest,
        metrics: &[CreateMetricRequest],
    ) -> Result<AthleteDetailResponse> {
        self.record_call();

        let athlete = Athlete {
            athlete_id: Uuid::new_v4(),
            name: req.name.clone(),
            age: req.age,
            team: req.team.clone(),
            created_at: Utc::now(),
        };

        // One write guard covers every insert, so readers never see a partial athlete
        let mut tables = self.tables.write().await;
        tables.athletes.push(athlete.clone());
        tables.metrics.extend(
            metrics
                .iter()
                .map(|m| Self::new_metric(athlete.athlete_id, m)),
        );
        let created = Self::metrics_of(&tables, athlete.athlete_id);

        Ok(AthleteDetailResponse::new(athlete, created))
    }

    async fn list(&self, filter: &AthleteListFilter) -> Result<Vec<Athlete>> {
        self.record_call();

        let tables = self.tables.read().await;
        let mut athletes: Vec<Athlete> = tables
            .athletes
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();

        // Stable sort: ties keep insertion order
        if let Some(sort) = filter.sort {
            athletes.sort_by(|a, b| {
                let ord = compare(a, b, sort.field);
                match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let offset = usize::try_from(filter.pagination.offset()).unwrap_or(usize::MAX);
        Ok(athletes
            .into_iter()
            .skip(offset)
            .take(filter.pagination.limit() as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Athlete> {
        self.record_call();

        self.tables
            .read()
            .await
            .athletes
            .iter()
            .find(|a| a.athlete_id == id)
            .cloned()
            .ok_or(StorageError::NotFound("Athlete"))
    }

    async fn find_detailed(&self, id: Uuid) -> Result<AthleteDetailResponse> {
        self.record_call();

        let tables = self.tables.read().await;
        let athlete = tables
            .athletes
            .iter()
            .find(|a| a.athlete_id == id)
            .cloned()
            .ok_or(StorageError::NotFound("Athlete"))?;
        let metrics = Self::metrics_of(&tables, id);

        Ok(AthleteDetailResponse::new(athlete, metrics))
    }

    async fn update(&self, id: Uuid, req: &UpdateAthleteRequest) -> Result<Athlete> {
        self.record_call();

        let mut tables = self.tables.write().await;
        let athlete = tables
            .athletes
            .iter_mut()
            .find(|a| a.athlete_id == id)
            .ok_or(StorageError::NotFound("Athlete"))?;
        req.apply_to(athlete);

        Ok(athlete.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.record_call();

        let mut tables = self.tables.write().await;
        let before = tables.athletes.len();
        tables.athletes.retain(|a| a.athlete_id != id);
        if tables.athletes.len() == before {
            return Err(StorageError::NotFound("Athlete"));
        }
        tables.metrics.retain(|m| m.athlete_id != id);

        Ok(())
    }
}

#[async_trait]
impl MetricRepository for InMemoryRepository {
    async fn create(
        &self,
        athlete_id: Uuid,
        req: &CreateMetricRequest,
    ) -> Result<PerformanceMetric> {
        self.record_call();

        let mut tables = self.tables.write().await;
        if !tables.athletes.iter().any(|a| a.athlete_id == athlete_id) {
            return Err(StorageError::NotFound("Athlete"));
        }

        let metric = Self::new_metric(athlete_id, req);
        tables.metrics.push(metric.clone());

        Ok(metric)
    }

    async fn list_for_athlete(
        &self,
        athlete_id: Uuid,
        metric_type: Option<&str>,
    ) -> Result<Vec<PerformanceMetric>> {
        self.record_call();

        let tables = self.tables.read().await;
        Ok(Self::metrics_of(&tables, athlete_id)
            .into_iter()
            .filter(|m| metric_type.is_none_or(|t| m.metric_type == t))
            .collect())
    }
}
