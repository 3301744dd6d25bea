use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{PaginationParams, QueryParamError, SortOrder, non_empty};
use super::metric::MetricResponse;
use crate::models::{Athlete, PerformanceMetric};

/// Response containing basic athlete information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AthleteResponse {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub team: String,
    pub created_at: DateTime<Utc>,
}

/// Athlete together with every performance metric it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AthleteDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub team: String,
    pub created_at: DateTime<Utc>,
    pub metrics: Vec<MetricResponse>,
}

impl AthleteDetailResponse {
    pub fn new(athlete: Athlete, metrics: Vec<PerformanceMetric>) -> Self {
        Self {
            id: athlete.athlete_id,
            name: athlete.name,
            age: athlete.age,
            team: athlete.team,
            created_at: athlete.created_at,
            metrics: metrics.into_iter().map(MetricResponse::from).collect(),
        }
    }
}

/// Request payload for creating a new athlete
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "John Doe", "age": 25, "team": "Team A"}))]
pub struct CreateAthleteRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(range(min = 1, message = "Age must be a positive integer"))]
    pub age: i32,

    #[validate(length(min = 1, max = 255, message = "Team must be between 1 and 255 characters"))]
    pub team: String,
}

/// Request payload for a partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAthleteRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "Age must be a positive integer"))]
    pub age: Option<i32>,

    #[validate(length(min = 1, max = 255, message = "Team must be between 1 and 255 characters"))]
    pub team: Option<String>,
}

impl UpdateAthleteRequest {
    /// Applies the present fields on top of `athlete`
    pub fn apply_to(&self, athlete: &mut Athlete) {
        if let Some(ref name) = self.name {
            athlete.name = name.clone();
        }
        if let Some(age) = self.age {
            athlete.age = age;
        }
        if let Some(ref team) = self.team {
            athlete.team = team.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AthleteSortField {
    Name,
    Age,
    Team,
}

impl AthleteSortField {
    pub const ALLOWED: &'static str = "name, age, team";

    pub fn parse(raw: &str) -> Result<Self, QueryParamError> {
        match raw {
            "name" => Ok(Self::Name),
            "age" => Ok(Self::Age),
            "team" => Ok(Self::Team),
            other => Err(QueryParamError::NotAllowed {
                param: "sort",
                allowed: Self::ALLOWED,
                value: other.to_string(),
            }),
        }
    }

    pub fn as_column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Team => "team",
        }
    }
}

/// Raw listing parameters exactly as they arrive on the query string.
/// Converted into an [`AthleteListFilter`] before the repository is touched.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AthleteListQuery {
    /// Exact-match team filter
    pub team: Option<String>,
    /// Page number, starting at 1 (default 1; lower values are treated as 1)
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    /// Page size (default 20, capped at 100; lower than 1 is treated as 1)
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
    /// Sort field
    #[param(value_type = Option<AthleteSortField>)]
    pub sort: Option<String>,
    /// Sort direction (default asc)
    #[param(value_type = Option<SortOrder>)]
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AthleteSort {
    pub field: AthleteSortField,
    pub order: SortOrder,
}

/// Validated listing filter. With no `sort`, rows come back in insertion
/// order; ties on the sort column fall back to insertion order too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AthleteListFilter {
    pub team: Option<String>,
    pub pagination: PaginationParams,
    pub sort: Option<AthleteSort>,
}

impl TryFrom<&AthleteListQuery> for AthleteListFilter {
    type Error = QueryParamError;

    fn try_from(query: &AthleteListQuery) -> Result<Self, Self::Error> {
        let pagination = PaginationParams::parse(query.page.as_deref(), query.limit.as_deref())?;
        let order = SortOrder::parse(query.order.as_deref())?;
        let sort = non_empty(query.sort.as_deref())
            .map(AthleteSortField::parse)
            .transpose()?
            .map(|field| AthleteSort { field, order });

        Ok(Self {
            team: non_empty(query.team.as_deref()).map(str::to_string),
            pagination,
            sort,
        })
    }
}

impl AthleteListFilter {
    pub fn matches(&self, athlete: &Athlete) -> bool {
        self.team.as_deref().is_none_or(|team| athlete.team == team)
    }
}

impl From<Athlete> for AthleteResponse {
    fn from(athlete: Athlete) -> Self {
        Self {
            id: athlete.athlete_id,
            name: athlete.name,
            age: athlete.age,
            team: athlete.team,
            created_at: athlete.created_at,
        }
    }
}
