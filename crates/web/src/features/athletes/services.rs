use storage::{
    AthleteRepository,
    dto::athlete::{
        AthleteDetailResponse, AthleteListFilter, CreateAthleteRequest, UpdateAthleteRequest,
    },
    error::{Result, StorageError},
    models::Athlete,
};
use uuid::Uuid;

/// Identifiers are UUIDs; anything else names an athlete that cannot exist.
pub fn parse_athlete_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn require_athlete_id(raw: &str) -> Result<Uuid> {
    parse_athlete_id(raw).ok_or(StorageError::NotFound("Athlete"))
}

/// List athletes matching an already validated filter
pub async fn list_athletes(
    repo: &dyn AthleteRepository,
    filter: &AthleteListFilter,
) -> Result<Vec<Athlete>> {
    repo.list(filter).await
}

/// Get athlete with all of its metrics
pub async fn get_athlete_detailed(
    repo: &dyn AthleteRepository,
    id: &str,
) -> Result<AthleteDetailResponse> {
    let id = require_athlete_id(id)?;
    repo.find_detailed(id).await
}

/// Create a new athlete
pub async fn create_athlete(
    repo: &dyn AthleteRepository,
    request: &CreateAthleteRequest,
) -> Result<Athlete> {
    let athlete = repo.create(request).await?;
    tracing::info!(athlete_id = %athlete.athlete_id, team = %athlete.team, "Athlete created");
    Ok(athlete)
}

/// Update an athlete
pub async fn update_athlete(
    repo: &dyn AthleteRepository,
    id: &str,
    request: &UpdateAthleteRequest,
) -> Result<Athlete> {
    let id = require_athlete_id(id)?;
    repo.update(id, request).await
}

/// Delete an athlete and its metrics
pub async fn delete_athlete(repo: &dyn AthleteRepository, id: &str) -> Result<()> {
    let id = require_athlete_id(id)?;
    repo.delete(id).await?;
    tracing::info!(athlete_id = %id, "Athlete deleted");
    Ok(())
}
