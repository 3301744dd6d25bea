use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use super::AthleteRepository;
use super::metric::INSERT_METRIC;
use crate::dto::athlete::{
    AthleteDetailResponse, AthleteListFilter, CreateAthleteRequest, UpdateAthleteRequest,
};
use crate::dto::metric::CreateMetricRequest;
use crate::error::{Result, StorageError};
use crate::models::{Athlete, PerformanceMetric};

const ATHLETE_COLUMNS: &str = "athlete_id, name, age, team, created_at";

const INSERT_ATHLETE: &str = r#"
    INSERT INTO athletes (athlete_id, name, age, team)
    VALUES ($1, $2, $3, $4)
    RETURNING athlete_id, name, age, team, created_at
"#;

#[derive(Clone)]
pub struct PgAthleteRepository {
    pool: PgPool,
}

impl PgAthleteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn metrics_for(&self, athlete_id: Uuid) -> Result<Vec<PerformanceMetric>> {
        let metrics = sqlx::query_as::<_, PerformanceMetric>(
            r#"
            SELECT metric_id, athlete_id, metric_type, value, unit, recorded_at
            FROM performance_metrics
            WHERE athlete_id = $1
            ORDER BY recorded_at, metric_id
            "#,
        )
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(metrics)
    }
}

#[async_trait]
impl AthleteRepository for PgAthleteRepository {
    async fn create(&self, req: &CreateAthleteRequest) -> Result<Athlete> {
        let athlete = sqlx::query_as::<_, Athlete>(INSERT_ATHLETE)
            .bind(Uuid::new_v4())
            .bind(&req.name)
            .bind(req.age)
            .bind(&req.team)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(athlete_id = %athlete.athlete_id, "Athlete created");

        Ok(athlete)
    }

    async fn create_with_metrics(
        &self,
        req: &CreateAthleteRequest,
        metrics: &[CreateMetricRequest],
    ) -> Result<AthleteDetailResponse> {
        let mut tx = self.pool.begin().await?;

        let athlete = sqlx::query_as::<_, Athlete>(INSERT_ATHLETE)
            .bind(Uuid::new_v4())
            .bind(&req.name)
            .bind(req.age)
            .bind(&req.team)
            .fetch_one(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(metrics.len());
        for metric in metrics {
            let row = sqlx::query_as::<_, PerformanceMetric>(INSERT_METRIC)
                .bind(Uuid::new_v4())
                .bind(athlete.athlete_id)
                .bind(&metric.metric_type)
                .bind(metric.value)
                .bind(&metric.unit)
                .bind(metric.timestamp)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        // Dropping the transaction on any earlier `?` rolls everything back
        tx.commit().await?;

        tracing::debug!(
            athlete_id = %athlete.athlete_id,
            metrics = created.len(),
            "Athlete created with metrics"
        );

        // NOW() is fixed for the whole transaction, so ties are common here
        created.sort_by_key(|m| (m.recorded_at, m.metric_id));
        Ok(AthleteDetailResponse::new(athlete, created))
    }

    async fn list(&self, filter: &AthleteListFilter) -> Result<Vec<Athlete>> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {ATHLETE_COLUMNS} FROM athletes WHERE 1=1"
        ));

        if let Some(ref team) = filter.team {
            query.push(" AND team = ");
            query.push_bind(team);
        }

        query.push(" ORDER BY ");
        if let Some(sort) = filter.sort {
            query.push(sort.field.as_column());
            query.push(" ");
            query.push(sort.order.as_sql());
            query.push(", ");
        }
        query.push("created_at ASC, athlete_id ASC");

        query.push(" LIMIT ");
        query.push_bind(filter.pagination.limit() as i64);
        query.push(" OFFSET ");
        query.push_bind(filter.pagination.offset() as i64);

        let athletes = query
            .build_query_as::<Athlete>()
            .fetch_all(&self.pool)
            .await?;

        Ok(athletes)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Athlete> {
        let athlete = sqlx::query_as::<_, Athlete>(&format!(
            "SELECT {ATHLETE_COLUMNS} FROM athletes WHERE athlete_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("Athlete"))?;

        Ok(athlete)
    }

    async fn find_detailed(&self, id: Uuid) -> Result<AthleteDetailResponse> {
        let athlete = self.find_by_id(id).await?;
        let metrics = self.metrics_for(athlete.athlete_id).await?;

        Ok(AthleteDetailResponse::new(athlete, metrics))
    }

    async fn update(&self, id: Uuid, req: &UpdateAthleteRequest) -> Result<Athlete> {
        let athlete = sqlx::query_as::<_, Athlete>(&format!(
            r#"
            UPDATE athletes
            SET name = COALESCE($2, name),
                age = COALESCE($3, age),
                team = COALESCE($4, team)
            WHERE athlete_id = $1
            RETURNING {ATHLETE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.name.as_deref())
        .bind(req.age)
        .bind(req.team.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound("Athlete"))?;

        Ok(athlete)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM athletes WHERE athlete_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Athlete"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::dto::athlete::AthleteListQuery;

    async fn connect() -> PgAthleteRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = Database::new(&url).await.unwrap();
        db.run_migrations().await.unwrap();
        db.athletes()
    }

    #[tokio::test]
    #[ignore] // Only run against a live PostgreSQL
    async fn test_crud_round_trip() {
        let repo = connect().await;

        let created = repo
            .create(&CreateAthleteRequest {
                name: "John Doe".to_string(),
                age: 25,
                team: "Team A".to_string(),
            })
            .await
            .unwrap();

        let found = repo.find_by_id(created.athlete_id).await.unwrap();
        assert_eq!(found.name, "John Doe");

        let updated = repo
            .update(
                created.athlete_id,
                &UpdateAthleteRequest {
                    team: Some("Team B".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.team, "Team B");
        assert_eq!(updated.age, 25);

        repo.delete(created.athlete_id).await.unwrap();
        assert!(repo.find_by_id(created.athlete_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[ignore] // Only run against a live PostgreSQL
    async fn test_create_with_metrics_is_atomic() {
        let repo = connect().await;
        let team = format!("team-{}", Uuid::new_v4());
        let req = CreateAthleteRequest {
            name: "Jane Smith".to_string(),
            age: 28,
            team: team.clone(),
        };
        let metric = |metric_type: &str| CreateMetricRequest {
            metric_type: metric_type.to_string(),
            value: 45.0,
            unit: "min".to_string(),
            timestamp: None,
        };

        let detail = repo
            .create_with_metrics(&req, &[metric("Endurance"), metric("Flexibility")])
            .await
            .unwrap();
        assert_eq!(detail.metrics.len(), 2);
        let stored = repo.find_detailed(detail.id).await.unwrap();
        assert_eq!(stored.metrics, detail.metrics);

        // An empty metric type violates the column check and aborts the whole insert
        let failed = repo
            .create_with_metrics(&req, &[metric("Endurance"), metric("")])
            .await;
        assert!(failed.is_err());

        let filter = AthleteListFilter::try_from(&AthleteListQuery {
            team: Some(team),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(repo.list(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore] // Only run against a live PostgreSQL
    async fn test_list_respects_limit_and_team() {
        let repo = connect().await;
        let team = format!("team-{}", Uuid::new_v4());

        for age in [21, 23, 25] {
            repo.create(&CreateAthleteRequest {
                name: format!("Athlete {age}"),
                age,
                team: team.clone(),
            })
            .await
            .unwrap();
        }

        let filter = AthleteListFilter::try_from(&AthleteListQuery {
            team: Some(team.clone()),
            limit: Some("2".to_string()),
            sort: Some("age".to_string()),
            order: Some("desc".to_string()),
            ..Default::default()
        })
        .unwrap();

        let athletes = repo.list(&filter).await.unwrap();
        assert_eq!(athletes.len(), 2);
        assert!(athletes.iter().all(|a| a.team == team));
        assert_eq!(athletes[0].age, 25);
        assert_eq!(athletes[1].age, 23);
    }
}
