use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Rejections raised while turning raw query parameters into a typed filter.
/// Always produced before any repository call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamError {
    #[error("{param} must be an integer, got '{value}'")]
    NotAnInteger { param: &'static str, value: String },

    #[error("{param} must be one of [{allowed}], got '{value}'")]
    NotAllowed {
        param: &'static str,
        allowed: &'static str,
        value: String,
    },
}

/// Treats a missing parameter and an empty one (`?team=`) the same way.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl PaginationParams {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Parses `page` and `limit`. Out-of-range numbers are clamped rather than
    /// rejected: `page` to `[1, u32::MAX]`, `limit` to `[1, MAX_LIMIT]`.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, QueryParamError> {
        let page = match non_empty(page) {
            Some(raw) => parse_integer("page", raw)?.clamp(1, u32::MAX as i64) as u32,
            None => Self::DEFAULT_PAGE,
        };

        let limit = match non_empty(limit) {
            Some(raw) => parse_integer("limit", raw)?.clamp(1, Self::MAX_LIMIT as i64) as u32,
            None => Self::DEFAULT_LIMIT,
        };

        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64).saturating_sub(1) * self.limit as u64
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

fn parse_integer(param: &'static str, raw: &str) -> Result<i64, QueryParamError> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(value) => Ok(value),
        // Digits only but too large for i64: saturate, clamping handles the rest
        Err(_) if is_integer_literal(trimmed) => Ok(if trimmed.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }),
        Err(_) => Err(QueryParamError::NotAnInteger {
            param,
            value: raw.to_string(),
        }),
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const ALLOWED: &'static str = "asc, desc";

    pub fn parse(raw: Option<&str>) -> Result<Self, QueryParamError> {
        match non_empty(raw) {
            None => Ok(Self::default()),
            Some("asc") => Ok(Self::Asc),
            Some("desc") => Ok(Self::Desc),
            Some(other) => Err(QueryParamError::NotAllowed {
                param: "order",
                allowed: Self::ALLOWED,
                value: other.to_string(),
            }),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
