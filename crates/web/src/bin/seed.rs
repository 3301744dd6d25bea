use anyhow::Context;
use storage::{
    AthleteRepository, Database,
    dto::{
        athlete::{AthleteListFilter, CreateAthleteRequest},
        metric::CreateMetricRequest,
    },
};

struct SeedAthlete {
    name: &'static str,
    age: i32,
    team: &'static str,
    metrics: &'static [(&'static str, f64, &'static str)],
}

const ATHLETES: &[SeedAthlete] = &[
    SeedAthlete {
        name: "John Doe",
        age: 25,
        team: "Team A",
        metrics: &[("Speed", 9.8, "m/s"), ("Strength", 150.0, "kg")],
    },
    SeedAthlete {
        name: "Jane Smith",
        age: 28,
        team: "Team B",
        metrics: &[("Endurance", 45.0, "min"), ("Flexibility", 25.0, "cm")],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    web::init_tracing();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    tracing::info!("Connecting to database");
    let db = Database::new(&database_url)
        .await
        .context("Failed to initialize database")?;

    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    let athletes = db.athletes();

    for seed in ATHLETES {
        if already_seeded(&athletes, seed).await? {
            tracing::info!(name = seed.name, "Athlete already present, skipping");
            continue;
        }

        let metrics: Vec<CreateMetricRequest> = seed
            .metrics
            .iter()
            .map(|(metric_type, value, unit)| CreateMetricRequest {
                metric_type: metric_type.to_string(),
                value: *value,
                unit: unit.to_string(),
                timestamp: None,
            })
            .collect();

        let athlete = athletes
            .create_with_metrics(
                &CreateAthleteRequest {
                    name: seed.name.to_string(),
                    age: seed.age,
                    team: seed.team.to_string(),
                },
                &metrics,
            )
            .await
            .with_context(|| format!("Failed to seed athlete {}", seed.name))?;

        tracing::info!(
            athlete_id = %athlete.id,
            name = %athlete.name,
            metrics = athlete.metrics.len(),
            "Seeded athlete"
        );
    }

    db.close().await;

    Ok(())
}

async fn already_seeded(
    athletes: &dyn AthleteRepository,
    seed: &SeedAthlete,
) -> anyhow::Result<bool> {
    let mut filter = AthleteListFilter {
        team: Some(seed.team.to_string()),
        ..Default::default()
    };

    // Walk the team's pages until the name turns up or the pages run out
    loop {
        let page = athletes
            .list(&filter)
            .await
            .with_context(|| format!("Failed to look up athlete {}", seed.name))?;
        if page.iter().any(|a| a.name == seed.name) {
            return Ok(true);
        }
        if page.len() < filter.pagination.limit() as usize {
            return Ok(false);
        }
        filter.pagination.page += 1;
    }
}
